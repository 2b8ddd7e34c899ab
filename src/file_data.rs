use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
};

use crate::{AttrType, Attribute, DmxError, Element, ElementId, ElementRef};

/// A loaded DMX file.
///
/// Owns every element of the file. The first element is the root.
#[derive(Clone, Debug, Default)]
pub struct FileData {
    elements: Vec<Element>,
    root_attribute: Attribute,
}

impl FileData {
    /// Wraps decoded elements, resolving the root and building the child lookup tables.
    pub(crate) fn new(elements: Vec<Element>) -> Result<Self, DmxError> {
        let root_attribute = Attribute::Element((!elements.is_empty()).then_some(ElementId(0)));
        let mut file = Self { elements, root_attribute };

        file.update_root_element()?;
        file.update_child_lookup_tables()?;

        Ok(file)
    }

    /// Returns every element in file order.
    pub fn get_elements(&self) -> &[Element] {
        &self.elements
    }

    /// Returns the element attribute pointing at the root, which has no reference if the file is empty.
    pub fn get_root_attribute(&self) -> &Attribute {
        &self.root_attribute
    }

    pub fn get_root(&self) -> Option<ElementRef<'_>> {
        self.get_element(self.root_attribute.as_element()?)
    }

    /// Resolves a handle. Handles that do not belong to this file return None.
    pub fn get_element(&self, id: ElementId) -> Option<ElementRef<'_>> {
        self.elements.get(id.0).map(|element| ElementRef::new(self, id, element))
    }

    fn is_live(&self, id: ElementId) -> bool {
        id.0 < self.elements.len()
    }

    /// Returns the live members of an element array, failing on members that are not elements.
    fn element_array_members(&self, items: &[Attribute]) -> Result<Vec<ElementId>, DmxError> {
        let mut members = Vec::with_capacity(items.len());

        for item in items {
            match item {
                Attribute::None | Attribute::Element(None) => continue,
                Attribute::Element(Some(member)) => {
                    if self.is_live(*member) {
                        members.push(*member);
                    }
                }
                _ => return Err(DmxError::MalformedElementArray(item.get_type())),
            }
        }

        Ok(members)
    }

    fn update_root_element(&self) -> Result<(), DmxError> {
        let mut nested_elements = HashSet::new();

        for element in &self.elements {
            for attribute in element.get_attributes().values() {
                match attribute {
                    Attribute::Element(Some(child)) if self.is_live(*child) => {
                        nested_elements.insert(*child);
                    }
                    Attribute::Array {
                        kind: AttrType::ElementArray,
                        items,
                    } => nested_elements.extend(self.element_array_members(items)?),
                    _ => {}
                }
            }
        }

        tracing::trace!(elements = self.elements.len(), nested = nested_elements.len(), "resolved root element");

        Ok(())
    }

    fn update_child_lookup_tables(&mut self) -> Result<(), DmxError> {
        let Some(root) = self.root_attribute.as_element() else {
            return Ok(());
        };

        let mut visited = HashSet::new();
        let mut pending = vec![root];

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }

            let Some(element) = self.elements.get(current.0) else {
                continue;
            };

            let mut children = Vec::new();

            for attribute in element.get_attributes().values() {
                match attribute {
                    Attribute::Element(Some(child)) => {
                        if let Some(child_element) = self.elements.get(child.0) {
                            children.push((child_element.get_name().to_string(), *child));
                            pending.push(*child);
                        }
                    }
                    Attribute::Array {
                        kind: AttrType::ElementArray,
                        items,
                    } => pending.extend(self.element_array_members(items)?),
                    _ => {}
                }
            }

            if let Some(element) = self.elements.get_mut(current.0) {
                for (name, child) in children {
                    element.set_child(name, child);
                }
            }
        }

        tracing::trace!(visited = visited.len(), "built child lookup tables");

        Ok(())
    }

    fn element_label(&self, reference: Option<ElementId>) -> &str {
        match reference {
            Some(id) => self.elements.get(id.0).map_or("expired", Element::get_name),
            None => "NULL",
        }
    }

    fn write_value(&self, f: &mut Formatter<'_>, attribute: &Attribute) -> fmt::Result {
        const ARRAY_PREVIEW_LIMIT: usize = 4;

        match attribute {
            Attribute::Element(reference) => f.write_str(self.element_label(*reference)),
            Attribute::Array {
                kind: AttrType::ElementArray,
                items,
            } => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    if index == ARRAY_PREVIEW_LIMIT {
                        return f.write_str("...");
                    }
                    match item {
                        Attribute::Element(reference) => f.write_str(self.element_label(*reference))?,
                        _ => write!(f, "{item}")?,
                    }
                }
                Ok(())
            }
            _ => write!(f, "{attribute}"),
        }
    }

    fn write_tree(&self, f: &mut Formatter<'_>, root: ElementId) -> fmt::Result {
        let mut visited = HashSet::from([root]);
        let mut steps = vec![TreeStep::Element { id: root, depth: 0 }];

        while let Some(step) = steps.pop() {
            match step {
                TreeStep::Element { id, depth } => {
                    let Some(element) = self.elements.get(id.0) else {
                        continue;
                    };

                    write!(f, "{}Element[{}][{}]", "\t".repeat(depth), element.get_name(), element.get_class())?;

                    let count = element.get_attributes().len();
                    steps.extend((0..count).rev().map(|index| TreeStep::Attribute { id, index, depth }));
                }
                TreeStep::Attribute { id, index, depth } => {
                    let Some((name, attribute)) = self.elements.get(id.0).and_then(|element| element.get_attributes().get_index(index))
                    else {
                        continue;
                    };

                    write!(f, "\n{}\t[{name}] = ", "\t".repeat(depth))?;
                    self.write_value(f, attribute)?;

                    let nested = match attribute {
                        Attribute::Element(Some(child)) => vec![*child],
                        Attribute::Array {
                            kind: AttrType::ElementArray,
                            items,
                        } => items.iter().filter_map(Attribute::as_element).collect(),
                        _ => Vec::new(),
                    };

                    steps.extend(nested.into_iter().rev().map(|id| TreeStep::Nested { id, depth: depth + 2 }));
                }
                TreeStep::Nested { id, depth } => {
                    if self.is_live(id) && visited.insert(id) {
                        writeln!(f)?;
                        steps.push(TreeStep::Element { id, depth });
                    }
                }
            }
        }

        Ok(())
    }
}

/// Pending output of [FileData]'s tree display.
enum TreeStep {
    Element { id: ElementId, depth: usize },
    Attribute { id: ElementId, index: usize, depth: usize },
    Nested { id: ElementId, depth: usize },
}

impl Display for FileData {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.root_attribute.as_element() {
            Some(root) => self.write_tree(f, root),
            None => Ok(()),
        }
    }
}
