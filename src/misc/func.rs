/// `n` evenly spaced points over the closed interval [a, b]
///
/// The end points are included exactly.
///
/// # Example
///
/// ```rust
/// use mtgp::misc::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
/// ```
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let step = (b - a) / (n - 1) as f64;
            let mut xs: Vec<f64> =
                (0..n).map(|k| a + step * k as f64).collect();
            xs[n - 1] = b;
            xs
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_end_points() {
        let xs = linspace(-10.0, 10.0, 50);
        assert_eq!(xs.len(), 50);
        assert_eq!(xs[0], -10.0);
        assert_eq!(xs[49], 10.0);
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linspace_spacing() {
        let xs = linspace(0.1, 5.0, 8);
        let step = (5.0 - 0.1) / 7.0;
        xs.windows(2)
            .for_each(|w| assert::close(w[1] - w[0], step, 1E-12));
    }

    #[test]
    fn linspace_empty() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
