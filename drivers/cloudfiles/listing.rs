//! 由扁平对象名重建虚拟目录
//!
//! Cloud Files 没有目录，只能按前缀列出对象后再拆分

use std::collections::BTreeSet;

use crate::storage::Listing;

/// 快速列表：去掉前缀后全部作为文件
pub fn quick_listing<I>(prefix: &str, names: I) -> Listing
where
    I: IntoIterator<Item = String>,
{
    let files = names
        .into_iter()
        .map(|name| strip(prefix, &name).to_string())
        .collect();
    Listing { dirs: Vec::new(), files }
}

/// 完整列表：只还原一层目录，目录排序去重，文件保持列表顺序
pub fn full_listing<I>(prefix: &str, names: I) -> Listing
where
    I: IntoIterator<Item = String>,
{
    let mut dirs = BTreeSet::new();
    let mut files = Vec::new();

    for name in names {
        let name = strip(prefix, &name);
        match first_dir(name) {
            Some(dir) => {
                dirs.insert(dir.to_string());
            }
            None if !name.is_empty() => files.push(name.to_string()),
            None => {}
        }
    }

    Listing {
        dirs: dirs.into_iter().collect(),
        files,
    }
}

fn strip<'a>(prefix: &str, name: &'a str) -> &'a str {
    name.strip_prefix(prefix).unwrap_or(name)
}

/// 首尾字符不参与查找；找到的 `/` 包含在返回的目录名中
fn first_dir(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    if bytes.len() < 3 {
        return None;
    }
    bytes[1..bytes.len() - 1]
        .iter()
        .position(|b| *b == b'/')
        .map(|i| &name[..i + 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_listing_root() {
        let listing = full_listing("", names(&["a.txt", "b/c.txt", "b/d/e.txt"]));
        assert_eq!(listing.dirs, vec!["b/"]);
        assert_eq!(listing.files, vec!["a.txt"]);
    }

    #[test]
    fn test_full_listing_subdir() {
        let listing = full_listing("b/", names(&["b/c.txt", "b/d/e.txt"]));
        assert_eq!(listing.dirs, vec!["d/"]);
        assert_eq!(listing.files, vec!["c.txt"]);
    }

    #[test]
    fn test_quick_listing_is_flat() {
        let listing = quick_listing("b/", names(&["b/c.txt", "b/d/e.txt"]));
        assert!(listing.dirs.is_empty());
        assert_eq!(listing.files, vec!["c.txt", "d/e.txt"]);
    }

    #[test]
    fn test_full_listing_edge_slashes() {
        // 首尾斜杠不构成目录
        let listing = full_listing("", names(&["/", "a/", "/a", "ab/", "x"]));
        assert!(listing.dirs.is_empty());
        assert_eq!(listing.files, vec!["/", "a/", "/a", "ab/", "x"]);

        let listing = full_listing("", names(&["/ab/c"]));
        assert_eq!(listing.dirs, vec!["/ab/"]);
    }

    #[test]
    fn test_full_listing_dedup_sorted_and_skips_marker() {
        let listing = full_listing("p/", names(&["p/", "p/z/1", "p/b.txt", "p/a/1", "p/z/2", "p/a.txt"]));
        assert_eq!(listing.dirs, vec!["a/", "z/"]);
        // 文件保持原顺序
        assert_eq!(listing.files, vec!["b.txt", "a.txt"]);
    }

    #[test]
    fn test_first_dir_multibyte() {
        assert_eq!(first_dir("文档/说明.txt"), Some("文档/"));
        assert_eq!(first_dir("é/"), None);
    }
}
