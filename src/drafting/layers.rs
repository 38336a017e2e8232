//! Layer hierarchy and line weights for the weight classes.
//!
//! The document's layer table is reached through [`LayerRepository`], a
//! find-or-create interface keyed by `(parent, name)`. [`LayerTable`] is an
//! in-memory implementation backed by a slotmap arena.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::LayerError;

use super::options::DrawingOptions;
use super::types::WeightClass;

slotmap::new_key_type! {
    /// Unique identifier for a layer in a layer table.
    pub struct LayerId;
}

slotmap::new_key_type! {
    /// Unique identifier for a line pattern in a layer table.
    pub struct LinePatternId;
}

/// What a layer may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Ordinary layer for drawing geometry.
    Drawing,
    /// Layer linked from another document; cannot receive geometry.
    Reference,
}

/// A stored layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerNode {
    /// Layer name, unique among its siblings.
    pub name: String,
    /// Parent layer, `None` at the top level.
    pub parent: Option<LayerId>,
    /// Plot weight in millimetres, `None` for the document default.
    pub line_weight: Option<f64>,
    /// Line pattern, `None` for continuous.
    pub line_pattern: Option<LinePatternId>,
    /// What the layer may hold.
    pub kind: LayerKind,
    /// Deleted layers stay in the arena but are invisible to lookups.
    pub deleted: bool,
}

/// Properties of a layer to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLayer {
    /// Layer name.
    pub name: String,
    /// Parent layer.
    pub parent: Option<LayerId>,
    /// Plot weight.
    pub line_weight: Option<f64>,
    /// Line pattern.
    pub line_pattern: Option<LinePatternId>,
}

impl NewLayer {
    /// A layer with default weight and pattern.
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<LayerId>) -> Self {
        Self {
            name: name.into(),
            parent,
            line_weight: None,
            line_pattern: None,
        }
    }
}

/// Access to a document's layer table.
pub trait LayerRepository {
    /// Looks up a live layer by name under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::Conflict`] if a layer of that name exists but
    /// cannot hold drawing geometry.
    fn find_by_name(
        &self,
        parent: Option<LayerId>,
        name: &str,
    ) -> Result<Option<LayerId>, LayerError>;

    /// Creates a drawing layer.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::MissingParent`] if the parent does not exist.
    fn create(&mut self, layer: NewLayer) -> Result<LayerId, LayerError>;

    /// Looks up a line pattern by name.
    fn find_line_pattern(&self, name: &str) -> Option<LinePatternId>;
}

/// In-memory layer table.
#[derive(Debug, Default)]
pub struct LayerTable {
    layers: SlotMap<LayerId, LayerNode>,
    patterns: SlotMap<LinePatternId, String>,
}

impl LayerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a live layer.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::NotFound`] if the layer does not exist or was
    /// deleted.
    pub fn node(&self, id: LayerId) -> Result<&LayerNode, LayerError> {
        self.layers
            .get(id)
            .filter(|n| !n.deleted)
            .ok_or_else(|| LayerError::NotFound(format!("{id:?}")))
    }

    /// Marks a layer as deleted.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::NotFound`] if the layer is not live.
    pub fn delete(&mut self, id: LayerId) -> Result<(), LayerError> {
        match self.layers.get_mut(id) {
            Some(node) if !node.deleted => {
                node.deleted = true;
                Ok(())
            }
            _ => Err(LayerError::NotFound(format!("{id:?}"))),
        }
    }

    /// Registers a line pattern.
    pub fn add_line_pattern(&mut self, name: impl Into<String>) -> LinePatternId {
        self.patterns.insert(name.into())
    }

    /// Inserts a reference layer, which holds no drawing geometry.
    pub fn insert_reference(
        &mut self,
        parent: Option<LayerId>,
        name: impl Into<String>,
    ) -> LayerId {
        self.layers.insert(LayerNode {
            name: name.into(),
            parent,
            line_weight: None,
            line_pattern: None,
            kind: LayerKind::Reference,
            deleted: false,
        })
    }

    /// Iterates over live layers.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &LayerNode)> {
        self.layers.iter().filter(|(_, n)| !n.deleted)
    }

    /// Number of live layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether the table has no live layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LayerRepository for LayerTable {
    fn find_by_name(
        &self,
        parent: Option<LayerId>,
        name: &str,
    ) -> Result<Option<LayerId>, LayerError> {
        let Some((id, node)) = self
            .iter()
            .find(|(_, n)| n.parent == parent && n.name == name)
        else {
            return Ok(None);
        };
        match node.kind {
            LayerKind::Drawing => Ok(Some(id)),
            LayerKind::Reference => Err(LayerError::Conflict(name.to_owned())),
        }
    }

    fn create(&mut self, layer: NewLayer) -> Result<LayerId, LayerError> {
        if let Some(parent) = layer.parent {
            if self.node(parent).is_err() {
                return Err(LayerError::MissingParent(layer.name));
            }
        }
        Ok(self.layers.insert(LayerNode {
            name: layer.name,
            parent: layer.parent,
            line_weight: layer.line_weight,
            line_pattern: layer.line_pattern,
            kind: LayerKind::Drawing,
            deleted: false,
        }))
    }

    fn find_line_pattern(&self, name: &str) -> Option<LinePatternId> {
        self.patterns
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| id)
    }
}

/// Layers chosen for each weight class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerAssignment {
    layers: BTreeMap<WeightClass, LayerId>,
    created: Vec<LayerId>,
}

impl LayerAssignment {
    /// Layer receiving pieces of `class`, `None` when no layer could be
    /// resolved.
    #[must_use]
    pub fn layer_for(&self, class: WeightClass) -> Option<LayerId> {
        self.layers.get(&class).copied()
    }

    /// Layers created by this plan, in creation order.
    #[must_use]
    pub fn created(&self) -> &[LayerId] {
        &self.created
    }
}

/// Find-or-create plan of the layer hierarchy for a set of weight classes.
///
/// ```text
/// root
/// ├── visible
/// │   ├── <class 0>   w0 * n^p
/// │   ├── ...
/// │   └── <class n-1> w0 * 1^p
/// └── hidden          hidden weight, hidden pattern
/// ```
///
/// Existing layers are reused as they are, so weights set by an earlier
/// run or by the user are never overwritten.
pub struct LayerPlan<'a> {
    options: &'a DrawingOptions,
    classes: Vec<WeightClass>,
}

impl<'a> LayerPlan<'a> {
    /// Creates a plan for the given classes; order and duplicates do not
    /// matter.
    #[must_use]
    pub fn new(options: &'a DrawingOptions, classes: &[WeightClass]) -> Self {
        let mut classes = classes.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { options, classes }
    }

    /// Resolves every layer of the plan in `repo`.
    ///
    /// A layer whose name is taken by an incompatible layer is skipped and
    /// its classes land on the parent layer. When the root itself is taken,
    /// nothing is created and every class stays unassigned.
    ///
    /// # Errors
    ///
    /// Returns any repository error other than a name conflict.
    pub fn apply(&self, repo: &mut dyn LayerRepository) -> Result<LayerAssignment, LayerError> {
        let names = &self.options.layer_names;
        let weights = &self.options.weights;
        let mut assignment = LayerAssignment::default();

        let Some(root) = ensure(repo, &mut assignment, NewLayer::new(&names.root, None))? else {
            warn!(root = %names.root, "no root layer, leaving every class unassigned");
            return Ok(assignment);
        };
        let root = Some(root);
        let visible_classes: Vec<_> = self
            .classes
            .iter()
            .copied()
            .filter(|c| *c != WeightClass::Hidden)
            .collect();

        if !visible_classes.is_empty() {
            let visible = ensure(repo, &mut assignment, NewLayer::new(&names.visible, root))?
                .or(root);
            let count = visible_classes.len();
            for (index, class) in visible_classes.into_iter().enumerate() {
                let layer = NewLayer {
                    line_weight: Some(weights.weight(index, count)),
                    ..NewLayer::new(class.name(), visible)
                };
                if let Some(id) = ensure(repo, &mut assignment, layer)?.or(visible) {
                    assignment.layers.insert(class, id);
                }
            }
        }

        if self.classes.contains(&WeightClass::Hidden) {
            let pattern = repo.find_line_pattern(&weights.hidden_pattern);
            if pattern.is_none() {
                debug!(
                    pattern = %weights.hidden_pattern,
                    "line pattern not found, hidden layer stays continuous"
                );
            }
            let layer = NewLayer {
                line_weight: Some(weights.hidden()),
                line_pattern: pattern,
                ..NewLayer::new(&names.hidden, root)
            };
            if let Some(id) = ensure(repo, &mut assignment, layer)?.or(root) {
                assignment.layers.insert(WeightClass::Hidden, id);
            }
        }

        debug!(
            classes = self.classes.len(),
            created = assignment.created.len(),
            "layer plan applied"
        );
        Ok(assignment)
    }
}

/// Finds or creates one layer. A conflict yields `Ok(None)`.
fn ensure(
    repo: &mut dyn LayerRepository,
    assignment: &mut LayerAssignment,
    layer: NewLayer,
) -> Result<Option<LayerId>, LayerError> {
    match repo.find_by_name(layer.parent, &layer.name) {
        Ok(Some(id)) => Ok(Some(id)),
        Ok(None) => {
            let id = repo.create(layer)?;
            assignment.created.push(id);
            Ok(Some(id))
        }
        Err(LayerError::Conflict(name)) => {
            warn!(%name, "layer name taken by an incompatible layer, using parent");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
