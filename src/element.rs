use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use indexmap::IndexMap;
use uuid::Uuid as UUID;

use crate::{AttrType, Attribute, FileData};

/// A handle to an element owned by a [FileData].
///
/// Handles are plain indices, so they stay valid for as long as the file they came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Returns the position of the element in [FileData::get_elements].
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The element struct represents a single element in the data model.
///
/// It contains a name, a class, a GUID and a set of attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    class: String,
    name: String,
    guid: [u8; 16],
    attributes: IndexMap<String, Attribute>,
    children: HashMap<String, ElementId>,
}

impl Element {
    pub(crate) fn new(class: impl Into<String>, name: impl Into<String>, guid: [u8; 16]) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            guid,
            attributes: IndexMap::new(),
            children: HashMap::new(),
        }
    }

    /// Creates an element with only a class. The name and GUID are filled in later by the text path.
    pub(crate) fn class(class: impl Into<String>) -> Self {
        Self::new(class, String::new(), [0; 16])
    }

    /// Returns the name of the element.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the class of the element.
    pub fn get_class(&self) -> &str {
        &self.class
    }

    /// Returns the raw GUID bytes as stored in the file.
    pub fn get_guid(&self) -> &[u8; 16] {
        &self.guid
    }

    pub(crate) fn set_guid(&mut self, guid: [u8; 16]) {
        self.guid = guid;
    }

    /// Returns the GUID as a [UUID].
    pub fn get_id(&self) -> UUID {
        UUID::from_bytes_le(self.guid)
    }

    /// Returns the attribute with the given name. If the attribute does not exist, returns None.
    pub fn get_attribute(&self, name: impl AsRef<str>) -> Option<&Attribute> {
        self.attributes.get(name.as_ref())
    }

    pub(crate) fn get_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    /// Sets the attribute with the given name, returning the previous one.
    pub(crate) fn set_attribute(&mut self, name: impl Into<String>, attribute: Attribute) -> Option<Attribute> {
        self.attributes.insert(name.into(), attribute)
    }

    /// Returns the value of the attribute with the given name. If the attribute does not exist or is not the same type, returns None.
    pub fn get_value<V>(&self, name: impl AsRef<str>) -> Option<&V>
    where
        for<'a> &'a V: TryFrom<&'a Attribute>,
    {
        self.attributes.get(name.as_ref()).and_then(|attribute| attribute.try_into().ok())
    }

    /// Returns the attributes of the element.
    pub fn get_attributes(&self) -> &IndexMap<String, Attribute> {
        &self.attributes
    }

    pub(crate) fn reserve_attributes(&mut self, additional: usize) {
        self.attributes.reserve(additional);
    }

    /// Returns the child registered under the given name by a singular element attribute.
    pub fn get_child(&self, name: impl AsRef<str>) -> Option<ElementId> {
        self.children.get(name.as_ref()).copied()
    }

    /// Returns the name to child map built after loading.
    pub fn get_children(&self) -> &HashMap<String, ElementId> {
        &self.children
    }

    pub(crate) fn set_child(&mut self, name: impl Into<String>, child: ElementId) {
        self.children.insert(name.into(), child);
    }
}

/// A borrowed element together with the file it lives in, so references can be followed.
#[derive(Clone, Copy, Debug)]
pub struct ElementRef<'a> {
    file: &'a FileData,
    id: ElementId,
    element: &'a Element,
}

impl<'a> ElementRef<'a> {
    pub(crate) fn new(file: &'a FileData, id: ElementId, element: &'a Element) -> Self {
        Self { file, id, element }
    }

    /// Returns the handle of this element.
    pub fn get_handle(&self) -> ElementId {
        self.id
    }

    /// Returns the underlying element with the lifetime of the file.
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Returns the named child element.
    ///
    /// Children registered by singular element attributes are checked first, then the members of every
    /// element array attribute in order.
    pub fn get(&self, name: impl AsRef<str>) -> Option<ElementRef<'a>> {
        let name = name.as_ref();

        if let Some(child) = self.element.get_child(name).and_then(|child| self.file.get_element(child)) {
            return Some(child);
        }

        self.element
            .get_attributes()
            .values()
            .filter_map(|attribute| attribute.as_array_of(AttrType::ElementArray))
            .flatten()
            .filter_map(Attribute::as_element)
            .filter_map(|member| self.file.get_element(member))
            .find(|member| member.get_name() == name)
    }

    /// Follows the element attribute with the given name.
    pub fn get_element(&self, attribute: impl AsRef<str>) -> Option<ElementRef<'a>> {
        let reference = self.element.get_attribute(attribute)?.as_element()?;
        self.file.get_element(reference)
    }

    /// Resolves the live members of the element array attribute with the given name.
    pub fn get_element_array(&self, attribute: impl AsRef<str>) -> Option<Vec<ElementRef<'a>>> {
        let members = self.element.get_attribute(attribute)?.as_array_of(AttrType::ElementArray)?;

        Some(
            members
                .iter()
                .filter_map(Attribute::as_element)
                .filter_map(|member| self.file.get_element(member))
                .collect(),
        )
    }
}

impl Deref for ElementRef<'_> {
    type Target = Element;

    fn deref(&self) -> &Self::Target {
        self.element
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.file, other.file) && self.id == other.id
    }
}
