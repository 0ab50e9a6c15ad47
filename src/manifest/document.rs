use toml_edit::{Item, Table, TableLike};

pub(crate) trait GroupGetter {
    fn get_groups(&self) -> Vec<String>;
}

pub(crate) trait PoetryGetter {
    fn get_poetry(&mut self) -> Option<&mut dyn TableLike>;
    fn get_group(&mut self, group: &str) -> Option<&mut dyn TableLike>;
}

pub(crate) trait DependenciesGetter {
    /// Returns the `dependencies` table, inserting an empty one when it is missing.
    ///
    /// A standard table is made explicit so it keeps its header once drained.
    fn get_dependencies(&mut self) -> Option<&mut dyn TableLike>;
}

pub(crate) trait DrainTable {
    fn drain_except(&mut self, keep: &[&str]) -> Vec<(String, Item)>;
}

impl GroupGetter for toml_edit::Document {
    fn get_groups(&self) -> Vec<String> {
        self.as_table()
            .get("tool")
            .and_then(|item| item.get("poetry"))
            .and_then(|item| item.get("group"))
            .and_then(|item| item.as_table_like())
            .map(|table| table.iter().map(|(key, _)| key.to_string()).collect::<Vec<_>>())
            .unwrap_or_default()
    }
}

impl PoetryGetter for toml_edit::Document {
    fn get_poetry(&mut self) -> Option<&mut dyn TableLike> {
        self.as_table_mut()
            .get_mut("tool")
            .and_then(|item| item.get_mut("poetry"))
            .and_then(|item| item.as_table_like_mut())
    }

    fn get_group(&mut self, group: &str) -> Option<&mut dyn TableLike> {
        self.get_poetry()
            .and_then(|poetry| poetry.get_mut("group"))
            .and_then(|item| item.get_mut(group))
            .and_then(|item| item.as_table_like_mut())
    }
}

impl<'a> DependenciesGetter for dyn TableLike + 'a {
    fn get_dependencies(&mut self) -> Option<&mut dyn TableLike> {
        if !self.contains_key("dependencies") {
            self.insert("dependencies", Item::Table(Table::new()));
        }

        let item = self.get_mut("dependencies")?;

        if let Some(table) = item.as_table_mut() {
            table.set_implicit(false);
        }

        item.as_table_like_mut()
    }
}

impl<'a> DrainTable for dyn TableLike + 'a {
    fn drain_except(&mut self, keep: &[&str]) -> Vec<(String, Item)> {
        let keys = self
            .iter()
            .map(|(key, _)| key.to_string())
            .filter(|key| !keep.contains(&key.as_str()))
            .collect::<Vec<_>>();

        keys.into_iter()
            .filter_map(|key| self.remove(&key).map(|item| (key, item)))
            .collect()
    }
}
