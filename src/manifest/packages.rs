use toml_edit::Item;

/// Group name for `tool.poetry.dependencies`.
pub(crate) const MAIN_GROUP: &str = "main";

/// Dependencies taken out of a manifest, grouped the way they were declared.
///
/// The main group always comes first; named groups follow in manifest order.
#[derive(Debug)]
pub(crate) struct Packages {
    groups: Vec<Group>,
}

#[derive(Debug)]
pub(crate) struct Group {
    pub(crate) name: String,
    pub(crate) packages: Vec<(String, Item)>,
}

impl Default for Packages {
    fn default() -> Self {
        Self {
            groups: vec![Group::new(MAIN_GROUP)],
        }
    }
}

impl Packages {
    /// Adds packages to `group`, creating it after the existing groups when needed.
    /// A package already present in the group is replaced.
    pub(crate) fn extend(&mut self, group: &str, packages: Vec<(String, Item)>) {
        let index = match self.groups.iter().position(|existing| existing.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(group));
                self.groups.len() - 1
            },
        };
        let target = &mut self.groups[index];

        for (name, item) in packages {
            match target.packages.iter_mut().find(|(existing, _)| *existing == name) {
                Some((_, existing)) => *existing = item,
                None => target.packages.push((name, item)),
            }
        }
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    #[cfg(test)]
    pub(crate) fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.iter().map(|group| group.packages.len()).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Group {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            packages: Vec::new(),
        }
    }

    pub(crate) fn is_main(&self) -> bool {
        self.name == MAIN_GROUP
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|(name, _)| name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(spec: &str) -> Item {
        toml_edit::value(spec)
    }

    #[test]
    fn main_group_comes_first() {
        let mut packages = Packages::default();
        packages.extend("dev", vec![("pytest".to_string(), version("^7.0"))]);
        packages.extend(MAIN_GROUP, vec![("requests".to_string(), version("^2.0"))]);

        let names = packages.groups().map(|group| group.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["main", "dev"]);
        assert_eq!(packages.len(), 2);
    }

    #[test]
    fn extending_a_group_replaces_duplicates() {
        let mut packages = Packages::default();
        packages.extend(MAIN_GROUP, vec![("requests".to_string(), version("^2.0"))]);
        packages.extend(
            MAIN_GROUP,
            vec![
                ("requests".to_string(), version("^2.31")),
                ("click".to_string(), version("^8.0")),
            ],
        );

        let main = packages.group(MAIN_GROUP).unwrap();
        assert_eq!(main.names(), ["requests", "click"]);
        assert_eq!(main.packages[0].1.as_str(), Some("^2.31"));
    }

    #[test]
    fn default_is_empty() {
        let packages = Packages::default();
        assert!(packages.is_empty());
        assert!(packages.group(MAIN_GROUP).unwrap().is_main());
    }
}
