use std::collections::{HashMap, HashSet};

use classlens_signature::{ClassType, MethodSignature, SimpleClassType, TypeArgument, TypeTree};
use log::trace;

use crate::{ClassFile, ClassFileError, MethodInfo, Result};

// Bounds referring to other type variables (`<T, U extends T>`) are followed at most this deep.
const MAX_BOUND_DEPTH: usize = 32;

/// Looks up class files by internal name while walking a class hierarchy.
pub trait ClassResolver {
    fn resolve(&self, class_name: &str) -> Option<&ClassFile>;
}

impl ClassResolver for HashMap<String, ClassFile> {
    fn resolve(&self, class_name: &str) -> Option<&ClassFile> {
        self.get(class_name)
    }
}

/// Resolves nothing: only the direct supertypes of a class are considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl ClassResolver for NoResolver {
    fn resolve(&self, _class_name: &str) -> Option<&ClassFile> {
        None
    }
}

/// A method together with the class that declares it.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredMethod<'a> {
    pub class_file: &'a ClassFile,
    pub method: &'a MethodInfo,
}
impl<'a> DeclaredMethod<'a> {
    /// Whether this method implements or overrides `target`, considering only the direct
    /// supertypes of the declaring class when substituting type arguments.
    pub fn is_implementation_of(
        &self,
        target: &DeclaredMethod<'_>,
        allow_erased_match: bool,
        allow_synthetic_match: bool,
    ) -> Result<bool> {
        self.is_implementation_of_in(
            target,
            allow_erased_match,
            allow_synthetic_match,
            &NoResolver,
        )
    }

    /// Like [`DeclaredMethod::is_implementation_of`], but walks supertypes through `resolver`
    /// when `target` is declared further up the hierarchy.
    pub fn is_implementation_of_in(
        &self,
        target: &DeclaredMethod<'_>,
        allow_erased_match: bool,
        allow_synthetic_match: bool,
        resolver: &dyn ClassResolver,
    ) -> Result<bool> {
        let (candidate, target_method) = (self.method, target.method);

        if candidate.name() != target_method.name() {
            return Ok(false);
        }
        if candidate.is_synthetic() && !allow_synthetic_match {
            trace!(
                "{}.{}{} is synthetic",
                self.class_file.class_name(),
                candidate.name(),
                candidate.descriptor()
            );
            return Ok(false);
        }

        let target_signature = target_method.generic_signature()?;
        if (target_signature.is_none() || allow_erased_match)
            && candidate.descriptor() == target_method.descriptor()
        {
            trace!(
                "{}.{}{} matches {} by descriptor",
                self.class_file.class_name(),
                candidate.name(),
                candidate.descriptor(),
                target.class_file.class_name()
            );
            return Ok(true);
        }

        let Some(target_signature) = target_signature else {
            return Ok(false);
        };
        let candidate_signature = candidate.method_signature()?;

        if target_signature.is_void() != candidate_signature.is_void()
            || target_signature.parameter_count() != candidate_signature.parameter_count()
        {
            return Ok(false);
        }

        let substitutions = SubstitutionMap::build(self.class_file, target.class_file, resolver)?;
        trace!(
            "Matching {}.{} against {} {} with {:?}",
            self.class_file.class_name(),
            candidate.name(),
            target.class_file.class_name(),
            target_signature,
            substitutions
        );

        let matcher = TypeMatcher {
            substitutions: &substitutions,
            target: *target,
            target_signature,
            candidate: *self,
        };

        if let (Some(target_return), Some(candidate_return)) = (
            target_signature.return_type(),
            candidate_signature.return_type(),
        ) {
            let same_return_type = matcher.same_type(
                Operand::target(target_return),
                Operand::candidate(candidate_return),
            )?;
            if !same_return_type {
                return Ok(false);
            }
        }

        for (target_parameter, candidate_parameter) in target_signature
            .parameters
            .iter()
            .zip(&candidate_signature.parameters)
        {
            if !matcher.same_type(
                Operand::target(target_parameter),
                Operand::candidate(candidate_parameter),
            )? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Binds the type parameters of a supertype to the type arguments a subclass supplies for
/// them, e.g. `T -> Ljava/lang/String;` for `class StringBox extends Box<String>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
    bindings: HashMap<String, TypeTree>,
}
impl SubstitutionMap {
    /// Binds the type parameters of `target_class` as seen from `candidate_class`.
    ///
    /// The map is empty when both are the same class or when `target_class` cannot be
    /// reached from `candidate_class`.
    pub fn build(
        candidate_class: &ClassFile,
        target_class: &ClassFile,
        resolver: &dyn ClassResolver,
    ) -> Result<Self> {
        let mut substitutions = Self::default();
        if candidate_class.class_name() == target_class.class_name() {
            return Ok(substitutions);
        }

        let mut visited = HashSet::new();
        visited.insert(candidate_class.class_name().to_owned());

        let reference = find_supertype(
            candidate_class.generic_supertypes()?,
            target_class.class_name(),
            resolver,
            &mut visited,
        )?;

        if let Some(reference) = reference {
            substitutions.bindings = bind_type_parameters(target_class, &reference)?;
        }

        Ok(substitutions)
    }

    pub fn get(&self, identifier: &str) -> Option<&TypeTree> {
        self.bindings.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeTree)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Searches `supertypes` and, through `resolver`, their supertypes for a reference to
/// `target_name`, substituting type arguments along the way.
fn find_supertype(
    supertypes: Vec<ClassType>,
    target_name: &str,
    resolver: &dyn ClassResolver,
    visited: &mut HashSet<String>,
) -> Result<Option<ClassType>> {
    if let Some(reference) = supertypes.iter().find(|s| s.erasure() == target_name) {
        return Ok(Some(reference.clone()));
    }

    for supertype in &supertypes {
        let name = supertype.erasure();
        if !visited.insert(name.clone()) {
            continue;
        }
        let Some(class_file) = resolver.resolve(&name) else {
            continue;
        };

        let bindings = bind_type_parameters(class_file, supertype)?;
        let inherited = class_file
            .generic_supertypes()?
            .iter()
            .map(|s| substitute_class_type(s, &bindings))
            .collect();

        if let Some(reference) = find_supertype(inherited, target_name, resolver, visited)? {
            return Ok(Some(reference));
        }
    }

    Ok(None)
}

/// Pairs the type parameters declared by `class_file` with the arguments of `reference`.
/// Raw references and missing arguments bind to `java/lang/Object`.
fn bind_type_parameters(
    class_file: &ClassFile,
    reference: &ClassType,
) -> Result<HashMap<String, TypeTree>> {
    let Some(class_signature) = class_file.class_signature()? else {
        return Ok(HashMap::new());
    };

    let type_arguments = reference.type_arguments();
    Ok(class_signature
        .type_parameters
        .iter()
        .enumerate()
        .map(|(i, type_parameter)| {
            let bound = match type_arguments.get(i) {
                Some(TypeArgument::Exact(tree)) | Some(TypeArgument::Extends(tree)) => {
                    tree.clone()
                }
                _ => TypeTree::object(),
            };
            (type_parameter.identifier.clone(), bound)
        })
        .collect())
}

fn substitute(tree: &TypeTree, bindings: &HashMap<String, TypeTree>) -> TypeTree {
    match tree {
        TypeTree::TypeVariable(identifier) => bindings
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| tree.clone()),
        TypeTree::Array(component) => TypeTree::Array(Box::new(substitute(component, bindings))),
        TypeTree::Class(class_type) => TypeTree::Class(substitute_class_type(class_type, bindings)),
        TypeTree::Primitive(_) => tree.clone(),
    }
}

fn substitute_class_type(class_type: &ClassType, bindings: &HashMap<String, TypeTree>) -> ClassType {
    let segment = |s: &SimpleClassType| SimpleClassType {
        identifier: s.identifier.clone(),
        type_arguments: s
            .type_arguments
            .iter()
            .map(|argument| match argument {
                TypeArgument::Any => TypeArgument::Any,
                TypeArgument::Extends(tree) => TypeArgument::Extends(substitute(tree, bindings)),
                TypeArgument::Super(tree) => TypeArgument::Super(substitute(tree, bindings)),
                TypeArgument::Exact(tree) => TypeArgument::Exact(substitute(tree, bindings)),
            })
            .collect(),
    };

    ClassType {
        package: class_type.package.clone(),
        simple: segment(&class_type.simple),
        suffixes: class_type.suffixes.iter().map(&segment).collect(),
    }
}

/// Which method a type tree was taken from, and so which type parameters are in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Target,
    Candidate,
}

#[derive(Debug, Clone, Copy)]
struct Operand<'t> {
    tree: &'t TypeTree,
    side: Side,
}
impl<'t> Operand<'t> {
    fn target(tree: &'t TypeTree) -> Self {
        Self {
            tree,
            side: Side::Target,
        }
    }

    fn candidate(tree: &'t TypeTree) -> Self {
        Self {
            tree,
            side: Side::Candidate,
        }
    }
}

struct TypeMatcher<'a> {
    substitutions: &'a SubstitutionMap,
    target: DeclaredMethod<'a>,
    target_signature: &'a MethodSignature,
    candidate: DeclaredMethod<'a>,
}
impl<'a> TypeMatcher<'a> {
    fn same_type(&self, a: Operand<'_>, b: Operand<'_>) -> Result<bool> {
        let (a, b) = (self.substitute(a), self.substitute(b));
        if a.tree == b.tree {
            return Ok(true);
        }

        match (a.tree, b.tree) {
            (TypeTree::Primitive(x), TypeTree::Primitive(y)) => Ok(x == y),
            (TypeTree::Array(x), TypeTree::Array(y)) => self.same_type(
                Operand { tree: x, side: a.side },
                Operand { tree: y, side: b.side },
            ),
            (TypeTree::Class(x), TypeTree::Class(y)) => self.same_class_type(x, a.side, y, b.side),
            (TypeTree::TypeVariable(_), _) | (_, TypeTree::TypeVariable(_)) => {
                Ok(self.erasure(a, 0)? == self.erasure(b, 0)?)
            }
            _ => Ok(false),
        }
    }

    fn same_class_type(
        &self,
        x: &ClassType,
        x_side: Side,
        y: &ClassType,
        y_side: Side,
    ) -> Result<bool> {
        if x.erasure() != y.erasure() || x.suffixes.len() != y.suffixes.len() {
            return Ok(false);
        }

        for (x_segment, y_segment) in x.segments().zip(y.segments()) {
            if x_segment.type_arguments.len() != y_segment.type_arguments.len() {
                return Ok(false);
            }

            for (x_argument, y_argument) in x_segment
                .type_arguments
                .iter()
                .zip(&y_segment.type_arguments)
            {
                if x_argument.is_wildcard() || y_argument.is_wildcard() {
                    continue;
                }
                let (Some(x_tree), Some(y_tree)) = (x_argument.type_tree(), y_argument.type_tree())
                else {
                    continue;
                };
                if !self.same_type(
                    Operand { tree: x_tree, side: x_side },
                    Operand { tree: y_tree, side: y_side },
                )? {
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }

    /// Replaces a type variable of the target's class by the type argument bound to it.
    fn substitute<'t>(&self, operand: Operand<'t>) -> Operand<'t>
    where
        'a: 't,
    {
        let TypeTree::TypeVariable(identifier) = operand.tree else {
            return operand;
        };
        if operand.side != Side::Target
            || self.target_signature.type_parameter_named(identifier).is_some()
        {
            return operand;
        }

        match self.substitutions.get(identifier) {
            Some(tree) => Operand::candidate(tree),
            None => operand,
        }
    }

    /// The descriptor a type erases to, following type variables to their bounds.
    fn erasure(&self, operand: Operand<'_>, depth: usize) -> Result<String> {
        match operand.tree {
            TypeTree::Primitive(base_type) => Ok(base_type.code().to_string()),
            TypeTree::Array(component) => Ok(format!(
                "[{}",
                self.erasure(
                    Operand {
                        tree: component,
                        side: operand.side
                    },
                    depth
                )?
            )),
            TypeTree::Class(class_type) => Ok(format!("L{};", class_type.erasure())),
            TypeTree::TypeVariable(identifier) => {
                let substituted = self.substitute(operand);
                if substituted.side != operand.side {
                    return self.erasure(substituted, depth);
                }

                let declaring = match operand.side {
                    Side::Target => self.target,
                    Side::Candidate => self.candidate,
                };
                if depth >= MAX_BOUND_DEPTH {
                    return Err(ClassFileError::UnresolvedTypeVariable {
                        owner: declaring.class_file.class_name().to_owned(),
                        variable: identifier.clone(),
                    });
                }

                let type_parameter = declaring
                    .method
                    .resolve_type_variable(declaring.class_file, identifier)?;
                match type_parameter.erasure_bound() {
                    Some(bound) => self.erasure(
                        Operand {
                            tree: bound,
                            side: operand.side,
                        },
                        depth + 1,
                    ),
                    None => Ok(format!("L{};", classlens_signature::OBJECT_CLASS)),
                }
            }
        }
    }
}
