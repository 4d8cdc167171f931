//! Detection of the result convention: a method whose single response
//! parameter is a two-member union tagged `[Result]`, success payload first,
//! error second.

use crate::{
    compiler::Compiler,
    error::Result,
    model::{MethodResponse, ResultShape},
    names::{legalize_lower, Context},
};
use brine_fidl_schema::{Attributed, Method, Struct, TypeKind, Union};

impl<'a> Compiler<'a> {
    pub fn compile_method_response(&self, method: &Method) -> Result<MethodResponse> {
        let wire_parameters = self.compile_parameter_array(&method.maybe_response)?;

        let (union, value_struct) = match self.detect_result_union(method) {
            Some(found) => found,
            None => {
                return Ok(MethodResponse {
                    method_parameters: wire_parameters.clone(),
                    wire_parameters,
                    result: None,
                })
            }
        };
        tracing::debug!(method = %method.name, result = %union.name, "method follows the result convention");

        let method_parameters = value_struct
            .members
            .iter()
            .map(|m| self.compile_parameter(&m.name, &m.type_, m.offset))
            .collect::<Result<Vec<_>>>()?;

        Ok(MethodResponse {
            wire_parameters,
            method_parameters,
            result: Some(ResultShape {
                result_type:  self.compile_union(union)?,
                value_type:   self.compile_type(&union.members[0].type_)?,
                error_type:   self.compile_type(&union.members[1].type_)?,
                value_fields: value_struct
                    .members
                    .iter()
                    .map(|m| legalize_lower(&m.name, Context::StructMember))
                    .collect(),
            }),
        })
    }

    /// The result union and its success struct, if `method` follows the
    /// convention. Both must be declared in the library being compiled.
    pub(crate) fn detect_result_union(&self, method: &Method) -> Option<(&'a Union, &'a Struct)> {
        if !method.has_response || method.maybe_response.len() != 1 {
            return None;
        }
        let response = &method.maybe_response[0].type_;
        if response.nullable {
            return None;
        }
        let identifier = match &response.kind {
            TypeKind::Identifier { identifier } => identifier,
            _ => return None,
        };

        let root = self.root;
        let union = root.find_union(identifier)?;
        if !union.has_attribute("Result") || union.members.len() != 2 {
            return None;
        }
        let value_identifier = match &union.members[0].type_.kind {
            TypeKind::Identifier { identifier } => identifier,
            _ => return None,
        };
        let value_struct = root.find_struct(value_identifier)?;
        Some((union, value_struct))
    }
}
