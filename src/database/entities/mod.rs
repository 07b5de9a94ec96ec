pub mod designs;
pub mod projects;
pub mod sessions;
pub mod todos;
pub mod users;
