use quote::{format_ident, quote};
use syn::{parse_macro_input, LitStr};

/// Expands to one `#[test]` per `.lox` file below the given directory
/// (relative to `bin/tests`). Each test feeds the fixture to `lox_expect`.
#[proc_macro]
pub fn generate_tests(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let fixture_dir = parse_macro_input!(input as LitStr).value();
    let root_dir = format!("{}/../{fixture_dir}", env!("CARGO_MANIFEST_DIR"));

    let mut fixtures = walkdir::WalkDir::new(&root_dir)
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| entry.into_path())
        .collect::<Vec<_>>();
    fixtures.sort();

    let tests = fixtures.iter().map(|path| {
        let test_file_path = path.to_string_lossy();
        let relative_test_path = path.strip_prefix(&root_dir).unwrap().with_extension("");
        let test_ident = format_ident!(
            "test_{}",
            relative_test_path.to_string_lossy().replace(['/', '-', '.'], "_")
        );
        quote! {
            #[test]
            fn #test_ident() {
                lox_expect(&std::fs::read_to_string(#test_file_path).unwrap());
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            let _ = env_logger::builder().is_test(true).try_init();
        }

        #(#tests)*
    }
    .into()
}
