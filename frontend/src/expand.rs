use std::collections::BTreeSet;

/// 文件展开状态，按文件路径记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandState {
    open: BTreeSet<String>,
}

impl ExpandState {
    pub fn is_expanded(&self, path: &str) -> bool {
        self.open.contains(path)
    }

    /// 切换展开状态，返回切换后的状态
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.open.remove(path) {
            false
        } else {
            self.open.insert(path.to_string());
            true
        }
    }

    pub fn expand_all<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        self.open.extend(paths.into_iter().map(str::to_string));
    }

    pub fn collapse_all(&mut self) {
        self.open.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.open.len()
    }
}
