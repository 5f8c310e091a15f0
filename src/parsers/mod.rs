/*!
 * Track parsers.
 *
 * - `reference`: timestamp-pair cue records from the streaming reference track
 * - `caption`: bilingual dialogue records from the fan-made caption track
 */

pub mod caption;
pub mod reference;

pub use caption::{parse_caption, repair_split_layout};
pub use reference::parse_reference;
