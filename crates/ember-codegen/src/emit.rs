//! Whole-program emission: lower every declared data type and function
//! signature into one IR module.

use ember_common::{Diagnostic, DiagnosticBuffer, Span};
use ember_ir::Module;
use ember_types::{Program, TypeKind};

use crate::lower::Lowerer;

/// Lower all concrete declarations of a program. Problems (stubs, unbound
/// variables) are reported per declaration and emission continues.
pub fn emit_program(
    program: &Program,
    file_name: &str,
    include_all: bool,
    diagnostics: &mut DiagnosticBuffer,
) -> Module {
    let mut module = Module::new();
    let mut lowerer = Lowerer::new(&program.types, &program.scope);

    for (name, did) in program.types.declared_data() {
        let ty = program.types.data_type_id(did);
        if program.types.with_data(did, |def| def.is_stub()) {
            // Referenced but never declared; the validator already
            // reported it where it was used.
            tracing::debug!("skipping stub {name} during emission");
            continue;
        }
        if program.types.is_generic(ty) {
            // Un-instantiated generic declarations have no layout; their
            // variants are lowered when a concrete use reaches them.
            continue;
        }
        if let Err(err) = lowerer.lower_type(&mut module.types, ty, false) {
            diagnostics.push(Diagnostic::error(
                file_name,
                Span::dummy(),
                err.to_string(),
                err.code(),
            ));
        }
    }

    for sigs in program.functions.values() {
        for sig in sigs {
            if program.types.is_generic(sig.ty) && !include_all {
                continue;
            }
            let (ret, params) = match program.types.kind(sig.ty) {
                TypeKind::Function { ret, params, .. } => (ret, params),
                _ => continue,
            };
            let lowered = (|| {
                let ret = lowerer.lower_type(&mut module.types, ret, include_all)?;
                let mut lowered_params = Vec::with_capacity(params.len());
                for &param in &params {
                    lowered_params.push(lowerer.lower_type(&mut module.types, param, include_all)?);
                }
                Ok::<_, ember_types::TypeError>((ret, lowered_params))
            })();
            match lowered {
                Ok((ret, params)) => module.declare_function(&sig.name, ret, params),
                Err(err) => diagnostics.push(Diagnostic::error(
                    file_name,
                    sig.span,
                    err.to_string(),
                    err.code(),
                )),
            }
        }
    }

    module
}
