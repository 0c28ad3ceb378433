use super::*;

mod bundles;
mod games;
mod packages;

pub use bundles::{
    create_bundle_handler, delete_bundle_handler, get_bundle_handler, list_bundles_handler,
};
pub use games::{
    create_game_handler, delete_game_handler, get_game_handler, list_games_handler,
    update_game_handler,
};
pub use packages::{
    create_package_handler, delete_package_handler, get_package_handler, list_packages_handler,
};
