//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled                |
//! |------------|---------------------------------|
//! | `session`  | `Login`, `Logout`               |
//! | `board`    | `Boards`, `Show`                |
//! | `task`     | `Add`, `Rename`, `Rm`, `Mv`     |

pub mod board;
pub mod session;
pub mod task;

pub use board::{cmd_boards, cmd_show};
pub use session::{cmd_login, cmd_logout, load_config};
pub use task::{cmd_add, cmd_mv, cmd_rename, cmd_rm};
