mod create_admin;
mod init_db;
mod seed;

pub use create_admin::cmd_create_admin;
pub use init_db::cmd_init_db;
pub use seed::cmd_seed;
