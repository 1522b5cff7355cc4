//! # Edit Session Management
//!
//! An EditSession owns one document being edited: the current
//! [`EditorState`], the identity generator, and the post-effect engine.
//!
//! Every entry point (commands, keys, typing, paste) builds a transaction
//! against the current state and hands it to [`EditSession::dispatch`], which
//! commits it and runs the post-effects. Entry points return `true` only
//! when something was handled; a `false` leaves the session untouched.

use crate::commands::{self, Command, CommandContext};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::identity;
use crate::keymap::{Key, KeyOutcome, KeyRouter};
use crate::post_effects::PostEffectEngine;
use crate::state::{EditorState, Transaction};
use quire_document::{migrate, schema, Document, IdGenerator, Node, SchemaViolation, Selection};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, instrument};

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    state: EditorState,
    ids: IdGenerator,
    config: EditorConfig,
    effects: PostEffectEngine,
    keys: KeyRouter,

    /// Number of committed transactions
    version: u64,
}

impl EditSession {
    /// Create a session over `doc`.
    ///
    /// Legacy content is migrated first when the config asks for it, then the
    /// post-effects run once so every node starts out identified.
    #[instrument(skip(doc, config))]
    pub fn new(id: String, doc: Document, config: EditorConfig) -> Self {
        let mut ids = match &config.id_seed {
            Some(seed) => IdGenerator::from_seed(seed.clone()),
            None => IdGenerator::new(&format!("{}:{}", id, current_timestamp())),
        };

        identity::reserve_ids(&doc, &mut ids);
        let doc = if config.migrate_on_load {
            migrate(&doc, &mut ids).0
        } else {
            doc
        };

        let effects = PostEffectEngine::new();
        let mut state = EditorState::new(doc);
        if let Some(tr) = effects.follow_up(&state, &mut ids) {
            state = state.apply(&tr);
        }
        debug!(seed = ids.seed(), "Session ready");

        Self {
            id,
            state,
            ids,
            config,
            effects,
            keys: KeyRouter::new(),
            version: 0,
        }
    }

    pub fn from_json(
        id: String,
        source: &str,
        config: EditorConfig,
    ) -> Result<Self, EditorError> {
        let doc = Document::from_json(source)?;
        Ok(Self::new(id, doc, config))
    }

    pub fn load(path: &Path, config: EditorConfig) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(path.display().to_string(), &source, config)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(self.state.doc().to_json_pretty()?)
    }

    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn doc(&self) -> &Document {
        self.state.doc()
    }

    pub fn selection(&self) -> &Selection {
        self.state.selection()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Content-rule and identity violations in the current tree
    pub fn check(&self) -> Vec<SchemaViolation> {
        schema::check(self.state.doc())
    }

    /// Like [`check`](Self::check), as an error when anything is wrong
    pub fn validate(&self) -> Result<(), EditorError> {
        let violations = self.check();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(EditorError::Schema(violations))
        }
    }

    /// Move the selection; both ends must resolve inside textblocks
    pub fn set_selection(&mut self, selection: Selection) -> Result<(), EditorError> {
        if !selection.is_valid_in(self.state.doc()) {
            return Err(EditorError::InvalidSelection(format!(
                "{} → {} does not resolve inside textblocks",
                selection.anchor, selection.head
            )));
        }
        self.state = EditorState::with_selection(self.state.doc().clone(), selection);
        Ok(())
    }

    /// Run `command`; `false` when it does not apply here
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn execute(&mut self, command: &Command) -> bool {
        let mut ctx = CommandContext::new(&mut self.ids, &self.config);
        match command.run(&self.state, &mut ctx) {
            Some(tr) => {
                self.dispatch(tr);
                true
            }
            None => false,
        }
    }

    /// Whether `command` would apply, without running it
    pub fn can_execute(&self, command: &Command) -> bool {
        let mut ids = self.ids.clone();
        let mut ctx = CommandContext::new(&mut ids, &self.config);
        command.try_run(&self.state, &mut ctx).is_ok()
    }

    /// Route a key event; `false` means default handling should run
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn handle_key(&mut self, key: &Key) -> bool {
        match self.keys.route(key, &self.state) {
            KeyOutcome::PassThrough => false,
            KeyOutcome::Consumed => {
                debug!("Key consumed without changes");
                true
            }
            KeyOutcome::Edit(tr) => {
                self.dispatch(tr);
                true
            }
        }
    }

    /// Replace the selection with `text`
    #[instrument(skip(self), fields(session = %self.id))]
    pub fn insert_text(&mut self, text: &str) -> bool {
        match commands::insert_text(&self.state, text) {
            Ok(tr) => {
                self.dispatch(tr);
                true
            }
            Err(reason) => {
                debug!(%reason, "Text insertion declined");
                false
            }
        }
    }

    /// Paste `nodes` at the cursor, regenerating any identity that collides
    /// with one already in the document
    #[instrument(skip(self, nodes), fields(session = %self.id, count = nodes.len()))]
    pub fn paste(&mut self, mut nodes: Vec<Node>) -> bool {
        let mut seen = identity::collect_ids(self.state.doc());
        identity::dedupe_fragment(&mut nodes, &mut seen, &mut self.ids);

        match commands::paste_fragment(&self.state, nodes) {
            Ok(tr) => {
                self.dispatch(tr);
                true
            }
            Err(reason) => {
                debug!(%reason, "Paste declined");
                false
            }
        }
    }

    /// Commit `tr`, then any follow-up the post-effects ask for
    pub fn dispatch(&mut self, tr: Transaction) {
        let mut next = self.state.apply(&tr);
        if tr.doc_changed() {
            if let Some(follow_up) = self.effects.follow_up(&next, &mut self.ids) {
                next = next.apply(&follow_up);
            }
        }

        self.state = next;
        self.version += 1;
        info!(
            session = %self.id,
            origin = tr.meta.origin.as_deref().unwrap_or("unknown"),
            steps = tr.steps().len(),
            version = self.version,
            "Committed transaction"
        );
    }
}

fn current_timestamp() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}
