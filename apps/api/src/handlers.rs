pub mod brands;
pub mod health;
pub mod members;
pub mod workspaces;
