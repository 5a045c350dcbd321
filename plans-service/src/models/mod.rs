pub mod carrier;
pub mod conversation;
pub mod plan;

pub use carrier::{display_label, CatalogEntry, Carrier};
pub use conversation::{ChatReply, ChatRequest, ConversationLog};
pub use plan::{
    age_band_lower_bound, Accommodation, AccommodationPrices, CarrierPlans, Plan, PriceRow,
    PriceTable,
};
