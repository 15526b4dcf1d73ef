pub mod loadout;
pub mod planet;
pub mod player;

pub use loadout::{AbilityId, ItemId, Loadout, ProjectId};
pub use planet::{Planet, SectorComposition};
pub use player::{Player, Team, Toggles};
