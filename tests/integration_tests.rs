//! Integration tests for file-mode compilation.
//!
//! These tests drive the front end the way the binary does: sources on disk,
//! the bundled prelude, include directories, definition files and rendered
//! diagnostics.

use std::{fs, path::PathBuf};

use origin::{
    ast::{ast::Arena, statements::Access},
    driver::{compile_file, def_path, load_def, make_def, CompileOptions},
    errors::errors::{DriverError, OdefError},
};

/// Fresh scratch directory for one test.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("originc_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(dir: &PathBuf, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_compile_simple_program() {
    let dir = scratch_dir("simple");
    let file = write_file(&dir, "main.og", "namespace demo;\nimport core;\nint x = 1 + 2;\n");

    let result = compile_file(&CompileOptions::new(&file)).unwrap();
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics());
    assert_eq!(result.sources.len(), 2);
    assert_eq!(result.unit.programs.len(), 2);

    let ast = result.emit("ast").unwrap();
    assert!(ast.starts_with("program demo\n  import core\n  var x: int\n"), "{}", ast);
    assert!(ast.contains("binary +"));
    assert!(ast.contains("int 1 : core::int64"));
}

#[test]
fn test_empty_file_compiles_cleanly() {
    let dir = scratch_dir("empty");
    let file = write_file(&dir, "main.og", "");

    let result = compile_file(&CompileOptions::new(&file)).unwrap();
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics());
}

#[test]
fn test_includes_join_the_unit() {
    let dir = scratch_dir("includes");
    let lib = dir.join("lib");
    fs::create_dir_all(&lib).unwrap();
    write_file(&lib, "point.og", "namespace geo;\nimport core;\nstruct point { public: int x; }\n");
    write_file(&lib, "notes.txt", "not a source");
    let file = write_file(&dir, "main.og", "import core;\nimport geo;\npoint p;\nint y = p.x;\n");

    let mut options = CompileOptions::new(&file);
    options.includes.push(lib.clone());
    let result = compile_file(&options).unwrap();
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics());
    assert_eq!(result.sources.len(), 3);
    assert!(result.source_text(&lib.join("point.og").to_string_lossy()).is_some());

    let without = compile_file(&CompileOptions::new(&file)).unwrap();
    assert!(without.diagnostics.has_errors());
    assert_eq!(without.diagnostics[0].message(), "unknown namespace geo");
}

#[test]
fn test_diagnostics_render_against_their_source() {
    let dir = scratch_dir("render");
    let file = write_file(&dir, "main.og", "import core;\nint y = z;\n");

    let result = compile_file(&CompileOptions::new(&file)).unwrap();
    assert_eq!(result.diagnostics.len(), 1);

    let rendered = result.render_diagnostics();
    assert!(rendered.starts_with("error[UndefinedVariable]: undefined variable 'z'\n"), "{}", rendered);
    assert!(rendered.contains(&format!("-> {}:2", file.to_string_lossy())));
    assert!(rendered.contains("2 | int y = z;"));
}

#[test]
fn test_driver_errors() {
    let dir = scratch_dir("errors");
    let file = write_file(&dir, "main.og", "");

    let mut options = CompileOptions::new(&file);
    options.target = String::from("llvm");
    assert!(matches!(
        compile_file(&options),
        Err(DriverError::UnknownTarget { target }) if target == "llvm"
    ));

    let missing = CompileOptions::new(dir.join("missing.og"));
    assert!(matches!(compile_file(&missing), Err(DriverError::Io { .. })));

    let mut bad_include = CompileOptions::new(&file);
    bad_include.includes.push(dir.join("nowhere"));
    assert!(matches!(compile_file(&bad_include), Err(DriverError::Io { .. })));
}

#[test]
fn test_definition_file_round_trip() {
    let dir = scratch_dir("odef");
    let file = write_file(
        &dir,
        "shapes.og",
        "namespace shapes;\nimport core;\nclass box<T> {\n    T value;\npublic:\n    T get() { return self.value; }\n}\nint count;\n",
    );
    assert_eq!(def_path(&file), dir.join("shapes.og.odef"));

    let (bytes, _, diagnostics) = make_def(&file).unwrap();
    assert!(diagnostics.is_empty());
    let out = def_path(&file);
    fs::write(&out, &bytes).unwrap();

    let mut arena = Arena::new();
    let program = load_def(&out, &mut arena).unwrap();
    assert_eq!(program.namespace_name, "shapes");
    assert_eq!(arena[program.vardecls[0]].name, "count");

    let class = &arena[program.classes[0]];
    assert_eq!(class.name, "box");
    assert_eq!(class.generics, vec!["T".to_string()]);
    assert_eq!(class.accesses, vec![Access::Private, Access::Public]);
}

#[test]
fn test_includes_load_definition_files() {
    let dir = scratch_dir("include_defs");
    let lib = dir.join("lib");
    fs::create_dir_all(&lib).unwrap();
    let point = write_file(&dir, "point.og", "namespace geo;\nimport core;\nstruct point { public: int x; }\n");
    let (bytes, _, _) = make_def(&point).unwrap();
    fs::write(lib.join("point.odef"), &bytes).unwrap();
    let file = write_file(&dir, "main.og", "namespace demo;\nimport core;\nimport geo;\npoint p;\nint y = p.x;\n");

    let mut options = CompileOptions::new(&file);
    options.includes.push(lib.clone());
    let result = compile_file(&options).unwrap();
    assert!(result.diagnostics.is_empty(), "{}", result.render_diagnostics());
    assert_eq!(result.sources.len(), 2);
    assert_eq!(result.unit.programs.len(), 3);

    // Only parsed programs are dumped
    let ast = result.emit("ast").unwrap();
    assert!(ast.starts_with("program demo\n"), "{}", ast);
    assert!(!ast.contains("program geo"));

    fs::write(lib.join("broken.odef"), "nope").unwrap();
    assert!(matches!(
        compile_file(&options),
        Err(DriverError::Odef(OdefError::TooShort { len: 4 }))
    ));
}

#[test]
fn test_load_def_rejects_garbage() {
    let dir = scratch_dir("garbage");
    let path = write_file(&dir, "junk.odef", "nope");

    let mut arena = Arena::new();
    assert!(matches!(
        load_def(&path, &mut arena),
        Err(DriverError::Odef(OdefError::TooShort { len: 4 }))
    ));
}
