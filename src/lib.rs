// Library exports for blastnet
pub mod blast;
pub mod identifiers;
pub mod identity;
pub mod io;
pub mod layout;
pub mod logging;
pub mod merge;
pub mod network;
pub mod normalize;
pub mod organism_map;
pub mod pipeline;
pub mod render;
pub mod strand;
pub mod style;
