use std::{
    collections::{HashMap, HashSet},
    env,
    fs::File,
};

use classlens_class_file::{ClassFile, ClassResolver, DeclaredMethod};
use memmap::Mmap;

fn main() {
    pretty_env_logger::init();

    let mut classes = HashMap::new();
    for path in env::args().skip(1) {
        let file = File::open(&path).unwrap();
        let mmap = unsafe { Mmap::map(&file).unwrap() };

        match classlens_class_file::decode(&mmap) {
            Ok(class_file) => {
                classes.insert(class_file.class_name().to_owned(), class_file);
            }
            Err(e) => log::warn!("Skipping {}: {}", path, e),
        }
    }

    let mut names = classes.keys().cloned().collect::<Vec<_>>();
    names.sort();

    for name in names {
        let Some(class_file) = classes.resolve(&name) else {
            continue;
        };
        print_class(class_file, &classes);
        println!();
    }
}

fn print_class(class_file: &ClassFile, classes: &HashMap<String, ClassFile>) {
    println!(
        "{:?} {} (version {}.{})",
        class_file.kind(),
        class_file.class_name(),
        class_file.major_version(),
        class_file.minor_version()
    );
    if let Some(super_class) = class_file.super_class() {
        println!("    extends {}", super_class);
    }
    for interface in class_file.interface_names() {
        println!("    implements {}", interface);
    }
    if let Ok(Some(source_file)) = class_file.source_file() {
        println!("    source {}", source_file);
    }

    for field in class_file.fields() {
        println!("    field {} {}", field.name(), field.descriptor());
    }

    for method in class_file.declared_methods() {
        let signature = method
            .method
            .signature()
            .ok()
            .flatten()
            .unwrap_or_else(|| method.method.descriptor().to_owned());
        println!("    method {}{}", method.method.name(), signature);

        for target in overridden_methods(method, classes) {
            println!(
                "        overrides {}.{}{}",
                target.class_file.class_name(),
                target.method.name(),
                target.method.descriptor()
            );
        }
    }
}

fn overridden_methods<'a>(
    method: DeclaredMethod<'_>,
    classes: &'a HashMap<String, ClassFile>,
) -> Vec<DeclaredMethod<'a>> {
    if method.method.is_constructor() || method.method.is_class_initializer() {
        return Vec::new();
    }

    supertypes(method.class_file, classes)
        .into_iter()
        .flat_map(ClassFile::declared_methods)
        .filter(|target| {
            method
                .is_implementation_of_in(target, false, false, classes)
                .unwrap_or_else(|e| {
                    log::warn!("{}: {}", method.class_file.class_name(), e);
                    false
                })
        })
        .collect()
}

/// Every loaded class `class_file` inherits from, directly or not.
fn supertypes<'a>(
    class_file: &ClassFile,
    classes: &'a HashMap<String, ClassFile>,
) -> Vec<&'a ClassFile> {
    let mut visited = HashSet::new();
    let mut pending = Vec::new();
    pending.extend(class_file.super_class().map(str::to_owned));
    pending.extend(class_file.interface_names().into_iter().map(str::to_owned));

    let mut supertypes = Vec::new();
    while let Some(name) = pending.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(supertype) = classes.resolve(&name) else {
            continue;
        };
        pending.extend(supertype.super_class().map(str::to_owned));
        pending.extend(supertype.interface_names().into_iter().map(str::to_owned));
        supertypes.push(supertype);
    }
    supertypes
}
