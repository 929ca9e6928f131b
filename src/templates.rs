pub const GPRMAX_INPUT_TEMPLATE: &str = include_str!("../templates/gprmax_input.in");
