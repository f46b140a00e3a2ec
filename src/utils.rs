/// Object name utility functions / 对象名称工具函数

/// Turn a listing path into an object-name prefix / 将列表路径转换为对象前缀
/// Non-empty paths get a trailing `/`; "" stays "" / 非空路径补齐结尾的 /
pub fn dir_prefix(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Percent-encode each `/`-separated segment of an object name / 按段编码对象名
/// Unreserved characters and the separators themselves are kept as is
pub fn encode_object_path(name: &str) -> String {
    name.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the `index`-th alternative for a taken name / 生成冲突文件名
/// Input: "docs/file.txt", 2 / 输入
/// Output: "docs/file (2).txt" / 输出
pub fn conflict_name(name: &str, index: u64) -> String {
    let (dir, file) = match name.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, name),
    };

    // Separate filename and extension / 分离文件名和扩展名
    let path = std::path::Path::new(file);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(file);
    let ext = path.extension().and_then(|e| e.to_str());

    // Strip an existing (n) suffix / 去掉已有的 (n) 后缀
    let base_stem = match stem.rfind(" (") {
        Some(pos) if stem.ends_with(')') => {
            let num_part = &stem[pos + 2..stem.len() - 1];
            if !num_part.is_empty() && num_part.chars().all(|c| c.is_ascii_digit()) {
                &stem[..pos]
            } else {
                stem
            }
        }
        _ => stem,
    };

    let file = match ext {
        Some(e) => format!("{} ({}).{}", base_stem, index, e),
        None => format!("{} ({})", base_stem, index),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, file),
        None => file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_prefix() {
        assert_eq!(dir_prefix(""), "");
        assert_eq!(dir_prefix("b"), "b/");
        assert_eq!(dir_prefix("b/"), "b/");
        assert_eq!(dir_prefix("a/b"), "a/b/");
    }

    #[test]
    fn test_encode_object_path() {
        assert_eq!(encode_object_path("a.txt"), "a.txt");
        assert_eq!(encode_object_path("b/d/e.txt"), "b/d/e.txt");
        assert_eq!(encode_object_path("my docs/a b.txt"), "my%20docs/a%20b.txt");
        assert_eq!(encode_object_path("q?x=1#y"), "q%3Fx%3D1%23y");
    }

    #[test]
    fn test_conflict_name() {
        assert_eq!(conflict_name("file.txt", 1), "file (1).txt");
        assert_eq!(conflict_name("file (1).txt", 2), "file (2).txt");
        assert_eq!(conflict_name("docs/file.txt", 3), "docs/file (3).txt");
        assert_eq!(conflict_name("README", 1), "README (1)");
        assert_eq!(conflict_name("my.dir/README", 1), "my.dir/README (1)");
        assert_eq!(conflict_name("v (beta).txt", 1), "v (beta) (1).txt");
    }
}
