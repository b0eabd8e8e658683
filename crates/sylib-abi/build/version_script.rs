//! Export map for `libsylib.so`.
//!
//! `version_scripts/sylib.map` lists the exports every build defines. Exports
//! gated on a cargo feature are spliced in after `global:` only when that
//! feature is on; the linker rejects map entries for undefined symbols.

/// Exports that exist only with the `c-variadic` feature.
pub const VARIADIC_EXPORTS: &[&str] = &["putf"];

/// Render the checked-in `template` for this build.
pub fn render(template: &str, c_variadic: bool) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    for line in template.lines() {
        out.push_str(line);
        out.push('\n');
        if c_variadic && line.trim() == "global:" {
            for name in VARIADIC_EXPORTS {
                out.push_str("    ");
                out.push_str(name);
                out.push_str(";\n");
            }
        }
    }
    out
}
