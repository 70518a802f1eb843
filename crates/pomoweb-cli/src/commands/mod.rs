pub mod run;
pub mod settings;
pub mod status;
