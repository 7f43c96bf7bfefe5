//! Verb handlers.
//!
//! Each handler validates its arguments in a fixed order (type, id, existence,
//! attributes) and only touches storage once every check has passed, so a
//! failed command leaves persisted state unchanged.

use tracing::instrument;

use hbnb_core::{Entity, EntityId, EntityKind};
use hbnb_infra::Storage;

use crate::attributes::{parse_create, parse_update};
use crate::error::CommandError;
use crate::interpreter::{Command, Verb};

/// Runs canonical commands against a storage backend.
pub struct Executor<S> {
    storage: S,
}

impl<S: Storage> Executor<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Execute one command. `Ok(Some(text))` is printed, `Ok(None)` is silent.
    #[instrument(skip_all, fields(verb = command.verb.name(), class = %command.type_name))]
    pub fn execute(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        match command.verb {
            Verb::Create => self.create(command),
            Verb::Show => self.show(command),
            Verb::Destroy => self.destroy(command),
            Verb::All => self.all(command),
            Verb::Count => self.count(command),
            Verb::Update => self.update(command),
        }
    }

    fn create(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let kind = required_kind(&command.type_name)?;
        let mut entity = Entity::new(kind);
        for assignment in parse_create(&command.attributes)? {
            assignment.apply(&mut entity)?;
        }
        let id = entity.id().to_string();
        self.storage.upsert(entity)?;
        self.storage.commit()?;
        tracing::debug!(%kind, %id, "entity created");
        Ok(Some(id))
    }

    fn show(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let entity = self.lookup(command)?;
        Ok(Some(entity.to_string()))
    }

    fn destroy(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let entity = self.lookup(command)?;
        self.storage.delete(&entity)?;
        self.storage.commit()?;
        Ok(None)
    }

    fn all(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let kind = match command.type_name.as_str() {
            "" => None,
            name => Some(parse_kind(name)?),
        };
        let forms: Vec<String> = self
            .storage
            .all(kind)?
            .values()
            .map(Entity::to_string)
            .collect();
        serde_json::to_string(&forms)
            .map(Some)
            .map_err(|e| hbnb_infra::StorageError::Serialization(e.to_string()).into())
    }

    fn count(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let kind = match command.type_name.as_str() {
            "" => return Err(CommandError::MissingType),
            "all" => None,
            name => Some(parse_kind(name)?),
        };
        Ok(Some(self.storage.all(kind)?.len().to_string()))
    }

    fn update(&mut self, command: &Command) -> Result<Option<String>, CommandError> {
        let mut entity = self.lookup(command)?;
        for assignment in parse_update(&command.attributes)? {
            assignment.apply(&mut entity)?;
        }
        entity.touch();
        self.storage.upsert(entity)?;
        self.storage.commit()?;
        Ok(None)
    }

    /// Resolve `<type> <id>` to a live entity.
    fn lookup(&self, command: &Command) -> Result<Entity, CommandError> {
        let kind = required_kind(&command.type_name)?;
        if command.id.is_empty() {
            return Err(CommandError::MissingId);
        }
        let id: EntityId = command.id.parse()?;
        self.storage
            .get(kind, &id)?
            .ok_or(CommandError::EntityNotFound)
    }
}

fn parse_kind(name: &str) -> Result<EntityKind, CommandError> {
    Ok(name.parse::<EntityKind>()?)
}

fn required_kind(name: &str) -> Result<EntityKind, CommandError> {
    if name.is_empty() {
        return Err(CommandError::MissingType);
    }
    parse_kind(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Input, parse};
    use hbnb_core::AttrValue;
    use hbnb_infra::FileStorage;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn executor(dir: &TempDir) -> Executor<FileStorage> {
        Executor::new(FileStorage::new(dir.path().join("hbnb.json")))
    }

    fn run<S: Storage>(exec: &mut Executor<S>, line: &str) -> Result<Option<String>, CommandError> {
        match parse(line)? {
            Input::Command(command) => exec.execute(&command),
            other => panic!("not a command: {other:?}"),
        }
    }

    fn stored<S: Storage>(exec: &Executor<S>, kind: EntityKind, id: &str) -> Entity {
        exec.storage()
            .get(kind, &id.parse().unwrap())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn create_returns_id_and_show_finds_it() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, r#"create User email="a@b.com" password="pwd""#)
            .unwrap()
            .unwrap();
        assert_eq!(id.len(), 36);

        let shown = run(&mut exec, &format!("show User {id}")).unwrap().unwrap();
        assert!(shown.starts_with(&format!("[User] ({id})")));
        assert!(shown.contains("email: a@b.com"));
    }

    #[test]
    fn create_coerces_numeric_attributes() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, r#"create Place name="Loft" max_guest=4 latitude=37.77"#)
            .unwrap()
            .unwrap();
        let place = stored(&exec, EntityKind::Place, &id);
        assert_eq!(place.get("max_guest"), Some(&AttrValue::Integer(4)));
        assert_eq!(place.get("latitude"), Some(&AttrValue::Float(37.77)));
        assert_eq!(place.created_at(), place.updated_at());
    }

    #[test]
    fn failed_create_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let err = run(&mut exec, "create Place max_guest=\"many\"").unwrap_err();
        assert_eq!(err.to_string(), "invalid value for max_guest: many");
        let err = run(&mut exec, "create State population=5").unwrap_err();
        assert_eq!(err.to_string(), "invalid attribute for State: population");
        assert_eq!(run(&mut exec, "count all").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn argument_errors_are_reported_in_order() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let msg = |exec: &mut Executor<FileStorage>, line: &str| run(exec, line).unwrap_err().to_string();

        assert_eq!(msg(&mut exec, "show"), "class name missing");
        assert_eq!(msg(&mut exec, "show Spaceship"), "class doesn't exist");
        assert_eq!(msg(&mut exec, "show User"), "instance id missing");
        assert_eq!(msg(&mut exec, "show User nope"), "no instance found");
        assert_eq!(msg(&mut exec, "update User nope"), "no instance found");
        assert_eq!(msg(&mut exec, "count"), "class name missing");
        assert_eq!(msg(&mut exec, "all Spaceship"), "class doesn't exist");

        let id = run(&mut exec, "create User").unwrap().unwrap();
        assert_eq!(msg(&mut exec, &format!("update User {id}")), "attribute name missing");
        assert_eq!(msg(&mut exec, &format!("update User {id} email")), "value missing");
        assert_eq!(
            msg(&mut exec, &format!("update User {id} id other")),
            "invalid attribute for User: id"
        );
    }

    #[test]
    fn update_touches_and_keeps_created_at() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, r#"create State name="Nevada""#).unwrap().unwrap();
        let before = stored(&exec, EntityKind::State, &id);

        run(&mut exec, &format!("update State {id} name \"California\"")).unwrap();
        let after = stored(&exec, EntityKind::State, &id);

        assert_eq!(after.text("name"), Some("California"));
        assert_eq!(after.created_at(), before.created_at());
        assert!(after.updated_at() > before.updated_at());
    }

    #[test]
    fn update_with_empty_value_is_rejected_and_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, r#"create State name="Nevada""#).unwrap().unwrap();
        let before = stored(&exec, EntityKind::State, &id);

        for line in [
            format!("update State {id} name \"\""),
            format!(r#"State.update("{id}", {{"name": ""}})"#),
        ] {
            assert_eq!(run(&mut exec, &line).unwrap_err().to_string(), "value missing");
        }
        assert_eq!(stored(&exec, EntityKind::State, &id), before);
    }

    #[test]
    fn failed_write_leaves_no_trace_of_the_command() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let kept = run(&mut exec, r#"create State name="Utah""#).unwrap().unwrap();

        let blocker = dir.path().join("hbnb.tmp");
        std::fs::create_dir(&blocker).unwrap();
        assert!(matches!(
            run(&mut exec, r#"create State name="Ghost""#),
            Err(CommandError::Storage(_))
        ));
        assert!(run(&mut exec, &format!("update State {kept} name \"Texas\"")).is_err());
        assert_eq!(run(&mut exec, "count State").unwrap().as_deref(), Some("1"));
        assert_eq!(stored(&exec, EntityKind::State, &kept).text("name"), Some("Utah"));

        std::fs::remove_dir(&blocker).unwrap();
        run(&mut exec, "create User").unwrap();

        let mut reopened = FileStorage::new(dir.path().join("hbnb.json"));
        reopened.reload().unwrap();
        let states = reopened.all(Some(EntityKind::State)).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states.values().next().unwrap().text("name"), Some("Utah"));
    }

    #[test]
    fn update_with_json_sets_amenity_links() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let place = run(&mut exec, "create Place").unwrap().unwrap();
        let wifi = run(&mut exec, r#"create Amenity name="Wifi""#).unwrap().unwrap();

        run(&mut exec, &format!(r#"Place.update("{place}", {{"amenity_ids": ["{wifi}"], "price_by_night": 80}})"#))
            .unwrap();
        let stored = stored(&exec, EntityKind::Place, &place);
        assert_eq!(stored.get("amenity_ids"), Some(&AttrValue::IdList(vec![wifi.parse().unwrap()])));
        assert_eq!(stored.get("price_by_night"), Some(&AttrValue::Integer(80)));
    }

    #[test]
    fn failed_update_leaves_entity_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, r#"create Place name="Loft""#).unwrap().unwrap();
        let before = stored(&exec, EntityKind::Place, &id);

        let line = format!(r#"Place.update("{id}", {{"name": "Barn", "max_guest": "lots"}})"#);
        assert!(matches!(
            run(&mut exec, &line),
            Err(CommandError::AttributeCoercionFailure { .. })
        ));
        assert_eq!(stored(&exec, EntityKind::Place, &id), before);
    }

    #[test]
    fn destroy_then_show_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        let id = run(&mut exec, "create City").unwrap().unwrap();
        assert_eq!(run(&mut exec, &format!("destroy City {id}")).unwrap(), None);
        assert!(matches!(
            run(&mut exec, &format!("show City {id}")),
            Err(CommandError::EntityNotFound)
        ));
    }

    #[test]
    fn all_renders_json_list_of_string_forms() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);
        assert_eq!(run(&mut exec, "all").unwrap().as_deref(), Some("[]"));

        run(&mut exec, r#"create State name="California""#).unwrap();
        run(&mut exec, "create User").unwrap();
        let listed: Vec<String> =
            serde_json::from_str(&run(&mut exec, "all State").unwrap().unwrap()).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].starts_with("[State]"));
        assert!(listed[0].contains("name: California"));

        let everything: Vec<String> =
            serde_json::from_str(&run(&mut exec, "all").unwrap().unwrap()).unwrap();
        assert_eq!(everything.len(), 2);
        assert_eq!(run(&mut exec, "count all").unwrap().as_deref(), Some("2"));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: `count <type>` always equals the length of `all <type>`.
        #[test]
        fn count_matches_all(creates in prop::collection::vec(0usize..EntityKind::ALL.len(), 0..12)) {
            let dir = TempDir::new().unwrap();
            let mut exec = executor(&dir);
            for idx in creates {
                run(&mut exec, &format!("create {}", EntityKind::ALL[idx])).unwrap();
            }
            for kind in EntityKind::ALL {
                let listed: Vec<String> = serde_json::from_str(
                    &run(&mut exec, &format!("all {kind}")).unwrap().unwrap(),
                ).unwrap();
                let counted = run(&mut exec, &format!("count {kind}")).unwrap().unwrap();
                prop_assert_eq!(counted, listed.len().to_string());
            }
        }
    }
}
