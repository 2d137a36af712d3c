//! Built-in response handlers (state mutators).

mod ack;
mod creature;
mod inventory;
mod settings;

pub use ack::{AwardedBadgesHandler, ChallengeHandler, HatchedEggsHandler};
pub use creature::CreatureActionHandler;
pub use inventory::InventoryDeltaHandler;
pub use settings::SettingsHandler;

use std::sync::Arc;

use waypoint_proto::request::RequestType;

use crate::route::ResponseRouter;

/// Register every built-in handler.
pub fn register_all(router: &ResponseRouter) {
    router.register(Arc::new(ChallengeHandler));
    router.register(Arc::new(HatchedEggsHandler));
    router.register(Arc::new(InventoryDeltaHandler));
    router.register(Arc::new(AwardedBadgesHandler));
    router.register(Arc::new(SettingsHandler));
    router.register(Arc::new(CreatureActionHandler::new(
        RequestType::ReleaseCreature,
    )));
    router.register(Arc::new(CreatureActionHandler::new(
        RequestType::EvolveCreature,
    )));
}
