//! Expansion of Slurm host lists such as `gpu[01-03,7],login1`.

use crate::error::{JobinfoError, Result};

/// Largest number of ids a single bracket range may produce.
pub const MAX_RANGE_LEN: u64 = 65_536;

/// Expand a compressed host list into individual node names, in order.
pub fn expand_nodelist(list: &str) -> Result<Vec<String>> {
    let mut nodes = Vec::new();
    for group in split_top_level(list)? {
        let group = group.trim();
        if group.is_empty() {
            continue;
        }
        nodes.extend(expand_group(group).ok_or_else(|| invalid(list))?);
    }
    Ok(nodes)
}

fn invalid(list: &str) -> JobinfoError {
    JobinfoError::NodeList(list.to_string())
}

/// Split at commas that are not inside brackets.
fn split_top_level(list: &str) -> Result<Vec<&str>> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1).ok_or_else(|| invalid(list))?,
            ',' if depth == 0 => {
                groups.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid(list));
    }
    groups.push(&list[start..]);
    Ok(groups)
}

fn expand_group(group: &str) -> Option<Vec<String>> {
    let Some(open) = group.find('[') else {
        return Some(vec![group.to_string()]);
    };
    let close = open + group[open..].find(']')?;
    let prefix = &group[..open];
    let suffixes = expand_group(&group[close + 1..])?;

    let mut names = Vec::new();
    for id in expand_ranges(&group[open + 1..close])? {
        for suffix in &suffixes {
            names.push(format!("{prefix}{id}{suffix}"));
        }
    }
    Some(names)
}

/// `1-3,07` becomes `1 2 3 07`; zero padding follows the range start.
fn expand_ranges(ranges: &str) -> Option<Vec<String>> {
    let mut ids = Vec::new();
    for item in ranges.split(',') {
        let item = item.trim();
        match item.split_once('-') {
            Some((lo, hi)) => {
                let width = lo.len();
                let lo: u64 = digits(lo)?;
                let hi: u64 = digits(hi)?;
                if lo > hi || hi - lo >= MAX_RANGE_LEN {
                    return None;
                }
                ids.extend((lo..=hi).map(|n| format!("{n:0width$}")));
            }
            None => {
                digits(item)?;
                ids.push(item.to_string());
            }
        }
    }
    Some(ids)
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
