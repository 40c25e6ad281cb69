//! Navigable schema tree with annotation walks
//!
//! Wraps the raw schema JSON in parent-linked nodes so error-code discovery
//! can walk *upward* from a violation: locate the schema for a JSON
//! Pointer, then climb parents until the wanted annotation appears. Nodes
//! are built lazily; children are never stored, so self-referential
//! schemas cannot create ownership cycles.
//!
//! Traversal is bounded two ways: a visited set keyed by schema `$id`
//! (nested object graphs like entity/entities are visited once), plus a
//! hard skip of the `vcardArray` property, whose jCard sub-schema is
//! intentionally self-recursive and carries no ids of its own.

use std::collections::HashSet;
use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::pointer;

use super::errors::SchemaResult;
use super::loader::SchemaStore;

/// Property whose sub-schema recurses without ids. Never descended when
/// searching by id.
const SELF_RECURSIVE_PROPERTY: &str = "vcardArray";

/// Raised when an annotation walk finds no code in the hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("No such error key ({error_key}) in the hierarchy around {search_key}")]
pub struct AnnotationNotFound {
    pub search_key: String,
    pub error_key: String,
}

/// Variants of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaNodeKind {
    /// Named mapping of child schemas (`properties`)
    Object,
    /// Single items child
    Array,
    /// Forwards to its resolved target (`$ref`)
    Reference,
    /// anyOf / oneOf / allOf alternatives
    Combined,
    /// Terminal
    Simple,
}

struct NodeInner<'s> {
    store: &'s SchemaStore,
    parent: Option<SchemaNode<'s>>,
    /// Name of the document this schema value lives in; relative `$ref`s
    /// resolve against it.
    doc: &'s str,
    schema: &'s Value,
    /// Property name in the parent object schema, empty elsewhere.
    property_name: String,
}

/// Cheap-to-clone handle on one node of the schema tree.
#[derive(Clone)]
pub struct SchemaNode<'s> {
    inner: Rc<NodeInner<'s>>,
}

impl<'s> SchemaNode<'s> {
    /// Wraps the named schema document as a parentless root.
    pub fn root(store: &'s SchemaStore, name: &str) -> SchemaResult<Self> {
        let (doc, schema) = store.document_entry(name)?;
        Ok(Self::new(store, None, doc, schema, String::new()))
    }

    fn new(
        store: &'s SchemaStore,
        parent: Option<SchemaNode<'s>>,
        doc: &'s str,
        schema: &'s Value,
        property_name: String,
    ) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                store,
                parent,
                doc,
                schema,
                property_name,
            }),
        }
    }

    fn make_child(&self, schema: &'s Value, doc: &'s str, property_name: &str) -> Self {
        Self::new(
            self.inner.store,
            Some(self.clone()),
            doc,
            schema,
            property_name.to_string(),
        )
    }

    pub fn schema(&self) -> &'s Value {
        self.inner.schema
    }

    pub fn parent(&self) -> Option<&SchemaNode<'s>> {
        self.inner.parent.as_ref()
    }

    pub fn property_name(&self) -> &str {
        &self.inner.property_name
    }

    /// Name of the schema document this node's raw value lives in.
    pub fn document_name(&self) -> &'s str {
        self.inner.doc
    }

    /// Identity of the wrapped schema value. Nodes wrapping the same raw
    /// value are the same schema wherever the walk met them.
    fn identity(&self) -> *const Value {
        std::ptr::from_ref(self.inner.schema)
    }

    fn as_map(&self) -> Option<&'s Map<String, Value>> {
        self.inner.schema.as_object()
    }

    fn properties(&self) -> Option<&'s Map<String, Value>> {
        self.as_map()?.get("properties")?.as_object()
    }

    pub fn kind(&self) -> SchemaNodeKind {
        let Some(object) = self.as_map() else {
            return SchemaNodeKind::Simple;
        };
        if object.contains_key("$ref") {
            SchemaNodeKind::Reference
        } else if ["anyOf", "oneOf", "allOf"]
            .iter()
            .any(|kw| object.contains_key(*kw))
        {
            SchemaNodeKind::Combined
        } else if object.contains_key("properties") {
            SchemaNodeKind::Object
        } else if object.contains_key("items") {
            SchemaNodeKind::Array
        } else {
            SchemaNodeKind::Simple
        }
    }

    pub fn schema_id(&self) -> Option<&'s str> {
        self.as_map()?.get("$id")?.as_str()
    }

    /// Unprocessed-keyword lookup on this node only; never merges
    /// ancestors.
    pub fn annotation(&self, key: &str) -> Option<&'s Value> {
        self.as_map()?.get(key)
    }

    pub fn has_annotation(&self, key: &str) -> bool {
        self.annotation(key).is_some()
    }

    /// The integer annotation under `key`, if present and integral.
    pub fn error_code(&self, key: &str) -> Option<i32> {
        self.annotation(key)?.as_i64().map(|code| code as i32)
    }

    /// Child nodes per variant. Reference nodes resolve to their target;
    /// an unresolvable reference has no children.
    pub fn children(&self) -> Vec<SchemaNode<'s>> {
        let doc = self.inner.doc;
        let Some(object) = self.as_map() else {
            return Vec::new();
        };
        match self.kind() {
            SchemaNodeKind::Object => self
                .properties()
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, child)| self.make_child(child, doc, name))
                        .collect()
                })
                .unwrap_or_default(),
            SchemaNodeKind::Array => object
                .get("items")
                .map(|items| vec![self.make_child(items, doc, "")])
                .unwrap_or_default(),
            SchemaNodeKind::Combined => ["anyOf", "oneOf", "allOf"]
                .iter()
                .filter_map(|kw| object.get(*kw))
                .filter_map(Value::as_array)
                .flatten()
                .map(|alternative| self.make_child(alternative, doc, ""))
                .collect(),
            SchemaNodeKind::Reference => object
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|reference| self.inner.store.resolve_ref(doc, reference))
                .map(|(target_doc, target)| vec![self.make_child(target, target_doc, "")])
                .unwrap_or_default(),
            SchemaNodeKind::Simple => Vec::new(),
        }
    }

    /// One-hop dereferencing: the resolved target for references, the node
    /// itself otherwise.
    pub fn dereferenced(&self) -> SchemaNode<'s> {
        if self.kind() == SchemaNodeKind::Reference {
            self.children().into_iter().next().unwrap_or_else(|| self.clone())
        } else {
            self.clone()
        }
    }

    /// Depth-first search for the object schema that declares `key` as one
    /// of its own properties; first match wins.
    pub fn find_parent_of_node_with(&self, key: &str) -> Option<SchemaNode<'s>> {
        self.find_parent_guarded(key, &mut HashSet::new())
    }

    fn find_parent_guarded(
        &self,
        key: &str,
        visited: &mut HashSet<*const Value>,
    ) -> Option<SchemaNode<'s>> {
        if !visited.insert(self.identity()) {
            return None;
        }
        if self.properties().is_some_and(|props| props.contains_key(key)) {
            return Some(self.clone());
        }
        for child in self.children() {
            if let Some(found) = child.find_parent_guarded(key, visited) {
                return Some(found);
            }
        }
        None
    }

    /// The child schema registered under `key` in this object schema.
    pub fn get_child(&self, key: &str) -> Option<SchemaNode<'s>> {
        let properties = self.properties()?;
        let (name, child) = properties.get_key_value(key)?;
        Some(self.make_child(child, self.inner.doc, name))
    }

    /// Descends to the schema of property `key` anywhere below this node,
    /// dereferencing one reference hop.
    pub fn find_child(&self, key: &str) -> Option<SchemaNode<'s>> {
        let parent = self.find_parent_of_node_with(key)?;
        Some(parent.get_child(key)?.dereferenced())
    }

    /// Finds the closest `error_key` annotation at or above the schema of
    /// `search_key`.
    ///
    /// Annotations closer to the searched node win; an annotation near the
    /// root never shadows an intervening one.
    pub fn search_bottom_most_error_code(
        &self,
        search_key: &str,
        error_key: &str,
    ) -> Result<i32, AnnotationNotFound> {
        let not_found = || AnnotationNotFound {
            search_key: search_key.to_string(),
            error_key: error_key.to_string(),
        };
        let node = self.find_child(search_key).ok_or_else(not_found)?;
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(code) = n.error_code(error_key) {
                return Ok(code);
            }
            current = n.parent().cloned();
        }
        Err(not_found())
    }

    /// Resolves a `#/a/b/3/c` pointer to its schema. Numeric segments are
    /// array indices: they carry no schema name of their own and step into
    /// the array's single items schema.
    pub fn find_associated_schema(&self, json_pointer: &str) -> Option<SchemaNode<'s>> {
        let elements: Vec<&str> = json_pointer.split('/').collect();
        if elements.len() < 2 {
            return None;
        }
        let mut node = self.clone();
        for element in &elements[1..] {
            if element.parse::<usize>().is_ok() {
                let dereferenced = node.dereferenced();
                if dereferenced.kind() == SchemaNodeKind::Array {
                    if let Some(items) = dereferenced.children().into_iter().next() {
                        node = items;
                    }
                }
                continue;
            }
            let parent = node.find_parent_of_node_with(element)?;
            node = parent.get_child(element)?;
        }
        Some(node)
    }

    /// Leaf alternatives of a combined schema, descending through nested
    /// combined and reference nodes.
    pub fn get_all_combined_children(&self) -> Vec<SchemaNode<'s>> {
        let mut leaves = Vec::new();
        self.collect_combined(&mut leaves, &mut HashSet::new());
        leaves
    }

    fn collect_combined(
        &self,
        leaves: &mut Vec<SchemaNode<'s>>,
        visited: &mut HashSet<*const Value>,
    ) {
        if !visited.insert(self.identity()) {
            return;
        }
        let children = self.children();
        if children.is_empty() {
            leaves.push(self.clone());
            return;
        }
        for child in children {
            match child.kind() {
                SchemaNodeKind::Combined | SchemaNodeKind::Reference => {
                    child.collect_combined(leaves, visited);
                }
                _ => leaves.push(child),
            }
        }
    }

    /// Closest node at or above this one bearing `validation_key`.
    pub fn find_associated_parent_validation_node(
        &self,
        validation_key: &str,
    ) -> Option<SchemaNode<'s>> {
        let mut current = Some(self.clone());
        while let Some(n) = current {
            if n.has_annotation(validation_key) {
                return Some(n);
            }
            current = n.parent().cloned();
        }
        None
    }

    /// Every `(node, key)` pair relevant to the value at `json_pointer`:
    /// for each leaf alternative of the associated schema, all ancestors
    /// bearing the `validation_key` annotation.
    pub fn find_validation_nodes(
        &self,
        json_pointer: &str,
        validation_key: &str,
    ) -> Vec<ValidationNode<'s>> {
        let Some(associated) = self.find_associated_schema(json_pointer) else {
            return Vec::new();
        };
        let associated = associated.dereferenced();
        let leaves = if associated.kind() == SchemaNodeKind::Combined {
            associated.get_all_combined_children()
        } else {
            vec![associated]
        };

        let mut seen: HashSet<*const Value> = HashSet::new();
        let mut nodes = Vec::new();
        for leaf in leaves {
            let mut current = Some(leaf);
            while let Some(n) = current {
                if n.has_annotation(validation_key) && seen.insert(n.identity()) {
                    nodes.push(ValidationNode::new(n.clone(), validation_key));
                }
                current = n.parent().cloned();
            }
        }
        nodes
    }

    /// Concrete JSON Pointers of every occurrence of the schema with
    /// `schema_id` in `document`.
    ///
    /// The schema path is reconstructed from parent links; array positions
    /// are concretized by enumerating the indices actually present in the
    /// document. Empty when the id is unknown or the document has no data
    /// at any matching position.
    pub fn find_json_pointers_by_schema_id(
        &self,
        schema_id: &str,
        document: &Value,
    ) -> JsonPointers {
        let Some(node) = self.find_by_id(schema_id, &mut HashSet::new()) else {
            return JsonPointers::default();
        };

        let mut stack: Vec<String> = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            if n.kind() == SchemaNodeKind::Array {
                stack.push("{}".to_string());
            }
            if n.parent().is_some_and(|p| p.kind() == SchemaNodeKind::Object) {
                stack.push(n.property_name().to_string());
            }
            current = n.parent().cloned();
        }

        let mut pointers: Vec<String> = vec!["#".to_string()];
        while let Some(segment) = stack.pop() {
            let mut next = Vec::new();
            if segment == "{}" {
                for p in &pointers {
                    if let Some(Value::Array(items)) = pointer::query(document, p) {
                        for index in 0..items.len() {
                            next.push(format!("{}/{}", p, index));
                        }
                    }
                }
            } else {
                for p in &pointers {
                    next.push(format!("{}/{}", p, segment));
                }
            }
            pointers = next;
        }
        JsonPointers::new(pointers)
    }

    fn find_by_id(
        &self,
        schema_id: &str,
        visited: &mut HashSet<String>,
    ) -> Option<SchemaNode<'s>> {
        if self.schema_id() == Some(schema_id) {
            return Some(self.clone());
        }
        if let Some(id) = self.schema_id() {
            visited.insert(id.to_string());
        }
        for child in self.children() {
            if child.property_name() == SELF_RECURSIVE_PROPERTY {
                continue;
            }
            if child.schema_id().is_some_and(|id| visited.contains(id)) {
                continue;
            }
            if let Some(found) = child.find_by_id(schema_id, visited) {
                return Some(found);
            }
        }
        None
    }

    fn collect_all(&self, nodes: &mut Vec<SchemaNode<'s>>, visited: &mut HashSet<String>) {
        if let Some(id) = self.schema_id() {
            visited.insert(id.to_string());
        }
        nodes.push(self.clone());
        for child in self.children() {
            if child.property_name() == SELF_RECURSIVE_PROPERTY {
                continue;
            }
            if child.schema_id().is_some_and(|id| visited.contains(id)) {
                continue;
            }
            child.collect_all(nodes, visited);
        }
    }

    /// Union of the string annotation `key` across every reachable node,
    /// sorted and deduplicated.
    pub fn find_all_values_of(&self, key: &str) -> Vec<String> {
        let mut nodes = Vec::new();
        self.collect_all(&mut nodes, &mut HashSet::new());
        let mut values: Vec<String> = nodes
            .iter()
            .filter_map(|n| n.annotation(key))
            .filter_map(Value::as_str)
            .map(String::from)
            .collect();
        values.sort();
        values.dedup();
        values
    }
}

/// A schema node paired with the annotation key that made it interesting.
///
/// The annotation's string value names a second annotation holding the
/// wrapper error code on an ancestor: `"validationName":
/// "stdRdapLinksValidation"` on the links schema pairs with
/// `"stdRdapLinksValidation": -10609` further up.
pub struct ValidationNode<'s> {
    node: SchemaNode<'s>,
    validation_key: String,
}

impl<'s> ValidationNode<'s> {
    fn new(node: SchemaNode<'s>, validation_key: &str) -> Self {
        Self {
            node,
            validation_key: validation_key.to_string(),
        }
    }

    pub fn node(&self) -> &SchemaNode<'s> {
        &self.node
    }

    /// The value of the pairing annotation, e.g. `stdRdapLinksValidation`.
    pub fn validation_name(&self) -> Option<&'s str> {
        self.node.annotation(&self.validation_key)?.as_str()
    }

    fn parent_validation_node(&self) -> Option<SchemaNode<'s>> {
        let name = self.validation_name()?;
        self.node.find_associated_parent_validation_node(name)
    }

    pub fn has_parent_validation_code(&self) -> bool {
        self.parent_validation_node().is_some()
    }

    /// The wrapper code registered under the validation name on the
    /// closest ancestor.
    pub fn parent_validation_code(&self) -> Option<i32> {
        let name = self.validation_name()?;
        self.parent_validation_node()?.error_code(name)
    }
}

/// Ordered, deduplicated set of concrete JSON Pointers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JsonPointers {
    pointers: Vec<String>,
}

impl JsonPointers {
    fn new(pointers: Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let pointers = pointers
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self { pointers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pointers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}
