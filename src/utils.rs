/// Path processing utility functions / 路径处理工具函数

/// Clean and normalize path / 清理和规范化路径
/// 1. Replace backslashes with forward slashes / 将反斜杠替换为正斜杠
/// 2. Ensure path starts with / / 确保路径以 / 开头
/// 3. Clean . and .. in path / 清理路径中的 . 和 ..
pub fn fix_and_clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    };

    clean_path(&path)
}

/// Clean path, handle ., .. and duplicate / / 清理路径，处理 . 和 .. 和重复的 /
/// `..` never climbs above the first segment.
fn clean_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Split a caller-supplied file path into clean relative segments.
/// Returns None if `..` would leave the container / 检查路径是否越界
pub fn relative_segments(path: &str) -> Option<Vec<&str>> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop()?;
            }
            _ => parts.push(part),
        }
    }
    Some(parts)
}

/// Join a base (URL or mount path) with more entries: single separators,
/// `.` dropped, `..` stops at the base / 拼接基础路径
pub fn join_base(base: &str, entries: &[&str]) -> String {
    let rest = entries.join("/");
    let rest = fix_and_clean_path(&rest);

    let (origin, base_path) = split_origin(base);
    let base_path = fix_and_clean_path(base_path);

    let joined = if rest == "/" {
        base_path
    } else if base_path == "/" {
        rest
    } else {
        format!("{}{}", base_path, rest)
    };

    format!("{}{}", origin, joined)
}

/// Split `https://host/path` into (`https://host`, `/path`); plain paths have no origin.
fn split_origin(base: &str) -> (&str, &str) {
    match base.find("://") {
        Some(pos) => {
            let after = pos + 3;
            match base[after..].find('/') {
                Some(slash) => base.split_at(after + slash),
                None => (base, "/"),
            }
        }
        None => ("", base),
    }
}

/// Strip a mount prefix from a caller path if it was passed back already normalized.
/// 从挂载路径中提取实际路径
pub fn strip_mount_prefix<'a>(mount_path: &str, path: &'a str) -> &'a str {
    let mount = mount_path.trim_end_matches('/');
    if mount.is_empty() {
        return path;
    }
    match path.strip_prefix(mount) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}
