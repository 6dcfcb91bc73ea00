#[allow(non_snake_case)]
pub mod Crystallization;
#[allow(non_snake_case)]
pub mod Dictionaries;
#[allow(non_snake_case)]
pub mod Utils;
pub mod library_manager;
