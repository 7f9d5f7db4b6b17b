//! numerical core: the exambirulobin kinetics and its explicit integration
/// right-hand side dy/dt = a + b*y + c*y^2 with the default coefficients of the exam
pub mod exambirulobin_model;
/// Forward Euler: the plain function over an arbitrary grid and the solver object
pub mod FE;
/// arange/linspace grids and grid validation
pub mod grid;
