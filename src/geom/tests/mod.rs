mod test_curve_basic;
mod test_linear_system_basic;
