/// Top-level entry of the editor's menu bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub name: String,
}

impl MenuEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub fn default_menu() -> Vec<MenuEntry> {
    ["File", "Edit", "Create", "Display", "Help"]
        .into_iter()
        .map(MenuEntry::new)
        .collect()
}
