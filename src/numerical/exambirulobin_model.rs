//! Kinetics of the exambirulobin protein
//!
//! dy/dt = a + b*y + c*y^2

/// coefficients of the right-hand side of the kinetic equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProteinKinetics {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for ProteinKinetics {
    fn default() -> Self {
        ProteinKinetics {
            a: 0.1,
            b: 0.02,
            c: 0.03,
        }
    }
}

impl ProteinKinetics {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        ProteinKinetics { a, b, c }
    }
    /// rate of change of the exambirulobin concentration for the value y
    pub fn deriv(&self, y: f64) -> f64 {
        self.a + self.b * y + self.c * y * y
    }
    /// the right-hand side as a plain closure, ready for the integrators
    pub fn as_fn(&self) -> impl Fn(f64) -> f64 + Copy {
        let kinetics = *self;
        move |y| kinetics.deriv(y)
    }
}

/// exambirulobin change over time as a function of the exambirulobin value, default coefficients
/// ```
/// use ExamSciThe::numerical::exambirulobin_model::deriv;
/// assert_eq!(deriv(0.0), 0.1);
/// ```
pub fn deriv(y: f64) -> f64 {
    ProteinKinetics::default().deriv(y)
}

pub fn deriv_with(y: f64, a: f64, b: f64, c: f64) -> f64 {
    ProteinKinetics::new(a, b, c).deriv(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_deriv_at_zero_is_a() {
        assert_eq!(deriv(0.0), 0.1);
        assert_eq!(deriv_with(0.0, 3.5, 7.0, -2.0), 3.5);
    }

    #[test]
    fn test_quadratic_term_uses_c() {
        // 0.1 + 0.02*2 + 0.03*4
        assert_relative_eq!(deriv(2.0), 0.26, epsilon = 1e-12);
        assert_relative_eq!(deriv_with(2.0, 0.0, 0.0, 1.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_monotonic_for_non_negative_y() {
        let kinetics = ProteinKinetics::default();
        let mut previous = kinetics.deriv(0.0);
        for i in 1..1000 {
            let y = i as f64 * 0.05;
            let current = kinetics.deriv(y);
            assert!(current > previous, "deriv not increasing at y = {}", y);
            previous = current;
        }
    }

    #[test]
    fn test_as_fn_matches_method() {
        let kinetics = ProteinKinetics::new(1.0, 2.0, 3.0);
        let f = kinetics.as_fn();
        for &y in &[-3.0, -0.5, 0.0, 1.25, 10.0] {
            assert_eq!(f(y), kinetics.deriv(y));
        }
    }
}
