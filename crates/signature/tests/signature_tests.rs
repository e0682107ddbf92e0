use classlens_signature::{
    BaseType, ClassSignature, FieldSignature, MethodDescriptor, MethodSignature, SignatureError,
    TypeArgument, TypeTree,
};

#[test]
fn test_hash_map_class_signature() {
    let signature: ClassSignature = "<K:Ljava/lang/Object;V:Ljava/lang/Object;>Ljava/util/AbstractMap<TK;TV;>;Ljava/util/Map<TK;TV;>;Ljava/lang/Cloneable;Ljava/io/Serializable;"
        .parse()
        .unwrap();

    assert_eq!(2, signature.type_parameter_count());
    assert_eq!("java/util/AbstractMap", signature.superclass.erasure());
    assert_eq!(3, signature.superinterface_count());
    assert_eq!(
        Some("java/util/Map".to_owned()),
        signature.superinterface(0).map(|i| i.erasure())
    );
    assert_eq!(
        &[
            TypeArgument::Exact(TypeTree::TypeVariable("K".into())),
            TypeArgument::Exact(TypeTree::TypeVariable("V".into())),
        ],
        signature.superinterface(0).unwrap().type_arguments()
    );
}

#[test]
fn test_class_signature_without_type_parameters() {
    let signature: ClassSignature = "Ljava/util/ArrayList<Ljava/lang/String;>;".parse().unwrap();

    assert_eq!(0, signature.type_parameter_count());
    assert_eq!(1, signature.superclass.type_arguments().len());
}

#[test]
fn test_enum_class_signature_displays_unchanged() {
    let text = "Ljava/lang/Enum<Ljava/lang/Thread$State;>;";

    assert_eq!(text, text.parse::<ClassSignature>().unwrap().to_string());
}

#[test]
fn test_stream_collect_method_signature() {
    let text = "<R:Ljava/lang/Object;A:Ljava/lang/Object;>(Ljava/util/stream/Collector<-TT;TA;TR;>;)TR;";
    let signature: MethodSignature = text.parse().unwrap();

    assert_eq!(2, signature.type_parameter_count());
    assert_eq!(Some(&TypeTree::TypeVariable("R".into())), signature.return_type());
    assert_eq!(text, signature.to_string());
}

#[test]
fn test_method_signature_with_throws_clause() {
    let signature: MethodSignature =
        "<X:Ljava/lang/Throwable;>(Ljava/util/function/Supplier<+TX;>;)TT;^TX;^Ljava/io/IOException;"
            .parse()
            .unwrap();

    assert_eq!(2, signature.throws_count());
    assert_eq!(
        Some("java/io/IOException".to_owned()),
        signature
            .throws_signature(1)
            .and_then(TypeTree::as_class)
            .map(|c| c.erasure())
    );
}

#[test]
fn test_field_signature_of_primitive_array_of_lists() {
    let signature: FieldSignature = "[Ljava/util/List<[I>;".parse().unwrap();

    let TypeTree::Array(component) = signature.type_tree() else {
        panic!("expected an array");
    };
    let list = component.as_class().unwrap();
    assert_eq!(
        &[TypeArgument::Exact(TypeTree::Array(Box::new(
            TypeTree::Primitive(BaseType::Int)
        )))],
        list.type_arguments()
    );
}

#[test]
fn test_field_signature_rejects_base_types() {
    assert!("I".parse::<FieldSignature>().is_err());
}

#[test]
fn test_method_descriptor_of_string_value_of() {
    let descriptor: MethodDescriptor = "([CII)Ljava/lang/String;".parse().unwrap();

    assert_eq!(3, descriptor.parameter_count());
    assert_eq!("([CII)Ljava/lang/String;", descriptor.to_string());
}

#[test]
fn test_truncated_signature_reports_the_input() {
    assert_eq!(
        Err(SignatureError::UnexpectedEnd {
            input: "(Ljava/util/List<".into()
        }),
        "(Ljava/util/List<".parse::<MethodSignature>()
    );
}
