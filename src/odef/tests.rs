use super::{decode, encode, ODEF_FILE, SIGNATURE};
use crate::{
    ast::{
        ast::{Arena, ProgramId},
        statements::Access,
        types::typing_to_string,
    },
    errors::errors::{Diagnostics, OdefError},
    parser::parser::parse,
    Source,
};

fn parse_program(text: &str) -> (Arena, ProgramId) {
    let mut arena = Arena::new();
    let mut diagnostics = Diagnostics::new();
    let program = parse(&Source::new("test.og", text), &mut arena, &mut diagnostics);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.messages());
    (arena, program)
}

fn encode_source(text: &str) -> Vec<u8> {
    let (arena, program) = parse_program(text);
    encode(&arena[program], &arena)
}

#[test]
fn test_header_and_minimal_payload() {
    let bytes = encode_source("namespace a;");

    assert_eq!(&bytes[..4], SIGNATURE);
    assert_eq!(&bytes[4..12], &41u64.to_le_bytes());
    assert_eq!(bytes.len(), 53);
    // namespace: length 1, then the name
    assert_eq!(&bytes[12..20], &1u64.to_le_bytes());
    assert_eq!(bytes[20], b'a');
}

#[test]
fn test_declarations_survive_decoding() {
    let source = "namespace shapes;
import core;
alias coord = int;
class point<T, Rest...> {
    T x;
public:
    point(T x) { }
    int operator+(point other) { }
}
struct unit { }
int[] origin = 0;";
    let bytes = encode_source(source);

    let mut arena = Arena::new();
    let program = decode(&bytes, &mut arena).unwrap();

    assert_eq!(program.namespace_name, "shapes");
    assert_eq!(program.imports.len(), 1);
    assert_eq!(program.imports[0].name, "core");
    assert_eq!(program.imports[0].span.file().as_str(), ODEF_FILE);

    let origin = &arena[program.vardecls[0]];
    assert_eq!(origin.name, "origin");
    assert!(origin.init.is_none());
    assert_eq!(typing_to_string(&arena, origin.typing.unwrap()), "int[]");

    let point = &arena[program.classes[0]];
    assert_eq!(point.name, "point");
    assert!(!point.is_struct);
    assert!(point.is_variadic);
    assert_eq!(point.generics, vec!["T".to_string(), "Rest".to_string()]);
    assert_eq!(point.accesses, vec![Access::Private, Access::Public, Access::Public]);

    let names: Vec<&str> = point.fields.iter().map(|f| arena[*f].name.as_str()).collect();
    assert_eq!(names, vec!["x", ".ctor", "operator+"]);
    assert!(arena[point.fields[1]].typing.is_none());
    let operator = arena[point.fields[2]].typing.unwrap();
    assert_eq!(typing_to_string(&arena, operator), "core::function<int, point>");

    assert!(arena[program.classes[1]].is_struct);
    assert_eq!(arena[program.aliases["coord"]].name, "int");
}

#[test]
fn test_rejects_short_input() {
    let mut arena = Arena::new();

    assert_eq!(
        decode(b"Org\x92", &mut arena).unwrap_err(),
        OdefError::TooShort { len: 4 }
    );
}

#[test]
fn test_rejects_bad_signature() {
    let mut bytes = encode_source("namespace a;");
    bytes[3] = 0x93;

    let mut arena = Arena::new();
    assert_eq!(decode(&bytes, &mut arena).unwrap_err(), OdefError::BadSignature);
}

#[test]
fn test_rejects_length_mismatch() {
    let bytes = encode_source("namespace a;");
    let mut arena = Arena::new();

    assert_eq!(
        decode(&bytes[..bytes.len() - 1], &mut arena).unwrap_err(),
        OdefError::Truncated
    );

    let mut longer = bytes.clone();
    longer.push(0);
    assert_eq!(
        decode(&longer, &mut arena).unwrap_err(),
        OdefError::TrailingBytes { count: 1 }
    );
}

#[test]
fn test_rejects_bad_payload_bytes() {
    let mut arena = Arena::new();

    // namespace "", no imports, one declaration "x", then its has-type flag
    let mut bad_flag = encode_source("int x;");
    bad_flag[45] = 2;
    assert_eq!(
        decode(&bad_flag, &mut arena).unwrap_err(),
        OdefError::InvalidFlag { value: 2 }
    );

    let mut bad_utf8 = encode_source("namespace a;");
    bad_utf8[20] = 0xFF;
    assert_eq!(decode(&bad_utf8, &mut arena).unwrap_err(), OdefError::InvalidUtf8);
}

#[test]
fn test_rejects_oversized_counts() {
    let mut bytes = encode_source("namespace a;");
    // import count claims far more entries than the payload holds
    bytes[21..29].copy_from_slice(&u64::MAX.to_le_bytes());

    let mut arena = Arena::new();
    assert_eq!(decode(&bytes, &mut arena).unwrap_err(), OdefError::Truncated);
}
