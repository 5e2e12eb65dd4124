use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::page_tree::is_page_tree_node;

/// Deep-copies objects from a source document into an output document.
///
/// The id map outlives a single copier so that objects shared between pages
/// (fonts, images, resource dictionaries) land in the output only once.
/// References to other page tree nodes are cut and become `null`; the output
/// builds its own page tree.
pub(crate) struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    id_map: &'a mut HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub(crate) fn new(
        source: &'a Document,
        target: &'a mut Document,
        id_map: &'a mut HashMap<ObjectId, ObjectId>,
    ) -> Self {
        Self {
            source,
            target,
            id_map,
        }
    }

    /// Copy a page dictionary that has already been detached from its parent.
    pub(crate) fn copy_page(&mut self, page: Dictionary) -> Result<ObjectId, lopdf::Error> {
        let page = self.remap_dictionary(page)?;
        Ok(self.target.add_object(page))
    }

    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the id before recursing so cycles terminate
        let new_id = self.target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;

        self.target.objects.insert(new_id, new_obj);
        Ok(new_id)
    }

    fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) if is_page_tree_node(self.source, id) => Ok(Object::Null),
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(id)?)),
            Object::Array(arr) => Ok(Object::Array(
                arr.into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Object::Dictionary(dict) => Ok(Object::Dictionary(self.remap_dictionary(dict)?)),
            Object::Stream(mut stream) => {
                stream.dict = self.remap_dictionary(stream.dict)?;
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }

    fn remap_dictionary(&mut self, mut dict: Dictionary) -> Result<Dictionary, lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            *value = self.remap_references(std::mem::replace(value, Object::Null))?;
        }
        Ok(dict)
    }
}
