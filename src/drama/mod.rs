/*!
 * Drama script parsing.
 *
 * A drama script is a plain text file:
 * - the first line is the title
 * - lines containing `=act=` separate acts
 * - lines containing `*scene*` separate scenes within an act
 * - a line starting with `<NAME>` opens a block of dialogue spoken by NAME
 *
 * Parsing is permissive and never fails. The resulting [`Drama`] is read by
 * the rehearsal page generator and the speech generator.
 */

pub mod blocks;
pub mod dialogue;
pub mod model;

pub use blocks::split_into_blocks;
pub use dialogue::extract_dialogues;
pub use model::{parse, Act, Dialogue, Drama, NumberedDialogue, Scene};

/// Marker separating acts
pub const ACT_KEYWORD: &str = "=act=";

/// Marker separating scenes inside an act
pub const SCENE_KEYWORD: &str = "*scene*";
