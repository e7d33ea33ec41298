pub mod check;
pub mod gen_conf;
pub mod list_modules;
pub mod list_variables;
