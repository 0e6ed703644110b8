/*!
 * Splitting a flat line sequence into blocks separated by a marker keyword.
 */

/// Split `lines` into blocks, using every line that contains `keyword` as a separator.
///
/// The keyword test is a case-insensitive substring match, so `"  *Scene* 2"`
/// separates blocks just like `"*scene*"`. Separator lines are dropped and
/// never produce empty blocks: leading, trailing or consecutive separators are
/// simply consumed. Non-separator lines are kept verbatim.
pub fn split_into_blocks<S: AsRef<str>>(lines: &[S], keyword: &str) -> Vec<Vec<String>> {
    let keyword = keyword.to_lowercase();
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.to_lowercase().contains(&keyword) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}
