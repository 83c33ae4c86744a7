pub use list::ListController;
pub use user::UserController;

mod list;
mod user;
