//! Rendering of extracted tables and enums as TypeSpec documents.

use tspec_core::{ColumnDefinition, EnumDefinition, TableDefinition, value_to_string};

use crate::{
    TspFile,
    ast::{Enum, Model, ModelProperty},
    naming::enum_member_identifier,
    type_mapper::TypeMapper,
};

/// Renders one document per table or enum.
#[derive(Debug, Clone, Default)]
pub struct Renderer<M> {
    mapper: M,
    namespace: Option<String>,
}

impl<M: TypeMapper> Renderer<M> {
    pub fn new(mapper: M, namespace: Option<String>) -> Self {
        Self { mapper, namespace }
    }

    /// `model <ClassName> { ... }` with one property per column.
    pub fn render_model(&self, table: &TableDefinition) -> String {
        let model = table
            .columns
            .iter()
            .fold(Model::new(&table.class_name), |model, column| {
                model.property_with(self.property(column))
            });
        self.file().add(model).render()
    }

    /// `enum <ClassName> { ... }`; values without a usable identifier are skipped.
    pub fn render_enum(&self, definition: &EnumDefinition) -> String {
        let decl = definition
            .values
            .iter()
            .filter_map(|value| enum_member_identifier(value).map(|ident| (ident, value)))
            .fold(Enum::new(&definition.class_name), |decl, (ident, value)| {
                decl.member(ident, value)
            });
        self.file().add(decl).render()
    }

    fn property(&self, column: &ColumnDefinition) -> ModelProperty {
        let mut property = ModelProperty::new(&column.name, self.mapper.map_column(column));
        if let Some(default) = column.option("default") {
            property = property.doc(format!("default: {}", value_to_string(default)));
        }
        if let Some(limit) = column.option("limit") {
            property = property.doc(format!("limit: {}", value_to_string(limit)));
        }
        if !column.is_required() {
            property = property.optional();
        }
        property
    }

    fn file(&self) -> TspFile {
        TspFile::new().namespace(self.namespace.clone())
    }
}
