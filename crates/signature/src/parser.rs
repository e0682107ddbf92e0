use crate::{
    BaseType, ClassSignature, ClassType, FieldType, MethodDescriptor, MethodSignature,
    SignatureError, SimpleClassType, TypeArgument, TypeParameter, TypeTree,
};

type Result<T, E = SignatureError> = std::result::Result<T, E>;

// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.3.2
const MAX_ARRAY_DIMENSIONS: usize = 255;

// Type argument lists nested inside each other are followed at most this deep.
const MAX_NESTING_DEPTH: usize = 255;

/// Recursive-descent parser for descriptors (JVMS 4.3) and signatures (JVMS 4.7.9.1).
///
/// Every entry point consumes the parser and requires the whole input to be used.
pub struct Parser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
}
impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
        }
    }

    pub fn parse_class_signature(mut self) -> Result<ClassSignature> {
        let type_parameters = self.parse_type_parameters()?;
        let superclass = self.parse_class_type()?;
        let mut superinterfaces = Vec::new();
        while !self.at_end() {
            superinterfaces.push(self.parse_class_type()?);
        }

        Ok(ClassSignature {
            type_parameters,
            superclass,
            superinterfaces,
        })
    }

    pub fn parse_method_signature(mut self) -> Result<MethodSignature> {
        let type_parameters = self.parse_type_parameters()?;

        self.expect('(')?;
        let mut parameters = Vec::new();
        while self.peek() != Some(')') {
            parameters.push(self.parse_type()?);
        }
        self.expect(')')?;

        let return_type = if self.eat('V') {
            None
        } else {
            Some(self.parse_type()?)
        };

        let mut throws = Vec::new();
        while self.eat('^') {
            let throws_signature = match self.peek() {
                Some('T') => self.parse_type_variable()?,
                _ => TypeTree::Class(self.parse_class_type()?),
            };
            throws.push(throws_signature);
        }
        self.finish()?;

        Ok(MethodSignature {
            type_parameters,
            parameters,
            return_type,
            throws,
        })
    }

    pub fn parse_field_signature(mut self) -> Result<TypeTree> {
        let type_tree = self.parse_reference_type()?;
        self.finish()?;
        Ok(type_tree)
    }

    pub fn parse_type_signature(mut self) -> Result<TypeTree> {
        let type_tree = self.parse_type()?;
        self.finish()?;
        Ok(type_tree)
    }

    pub fn parse_field_descriptor(mut self) -> Result<FieldType> {
        let field_type = self.parse_field_type()?;
        self.finish()?;
        Ok(field_type)
    }

    pub fn parse_method_descriptor(mut self) -> Result<MethodDescriptor> {
        self.expect('(')?;
        let mut parameters = Vec::new();
        while self.peek() != Some(')') {
            parameters.push(self.parse_field_type()?);
        }
        self.expect(')')?;

        let return_type = if self.eat('V') {
            None
        } else {
            Some(self.parse_field_type()?)
        };
        self.finish()?;

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    fn parse_field_type(&mut self) -> Result<FieldType> {
        let dimensions = self.parse_array_dimensions()?;
        let element_type = match self.peek() {
            Some('L') => {
                self.bump();
                let start = self.position;
                while self.peek().map_or(false, |c| c != ';') {
                    self.bump();
                }
                let input = self.input;
                let class_name = &input[start..self.position];
                if class_name.is_empty() {
                    return Err(self.unexpected());
                }
                self.expect(';')?;
                FieldType::Object(class_name.to_owned())
            }
            Some(c) => match BaseType::from_code(c) {
                Some(base_type) => {
                    self.bump();
                    FieldType::Base(base_type)
                }
                None => return Err(self.unexpected()),
            },
            None => return Err(self.unexpected()),
        };

        Ok((0..dimensions).fold(element_type, |t, _| FieldType::Array(Box::new(t))))
    }

    /// JavaTypeSignature: a reference type or a base type.
    fn parse_type(&mut self) -> Result<TypeTree> {
        if let Some(base_type) = self.peek().and_then(BaseType::from_code) {
            self.bump();
            return Ok(TypeTree::Primitive(base_type));
        }
        self.parse_reference_type()
    }

    fn parse_reference_type(&mut self) -> Result<TypeTree> {
        match self.peek() {
            Some('L') => Ok(TypeTree::Class(self.parse_class_type()?)),
            Some('T') => self.parse_type_variable(),
            Some('[') => {
                let dimensions = self.parse_array_dimensions()?;
                let component_type = self.parse_type()?;
                Ok((0..dimensions).fold(component_type, |t, _| TypeTree::Array(Box::new(t))))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array_dimensions(&mut self) -> Result<usize> {
        let start = self.position;
        let mut dimensions = 0;
        while self.eat('[') {
            dimensions += 1;
        }

        if dimensions > MAX_ARRAY_DIMENSIONS {
            return Err(SignatureError::TooManyDimensions {
                position: start,
                input: self.input.to_owned(),
            });
        }
        Ok(dimensions)
    }

    fn parse_type_variable(&mut self) -> Result<TypeTree> {
        self.expect('T')?;
        let identifier = self.parse_identifier()?;
        self.expect(';')?;
        Ok(TypeTree::TypeVariable(identifier.to_owned()))
    }

    fn parse_class_type(&mut self) -> Result<ClassType> {
        self.expect('L')?;

        let mut package = String::new();
        let identifier = loop {
            let identifier = self.parse_identifier()?;
            if !self.eat('/') {
                break identifier;
            }
            package.push_str(identifier);
            package.push('/');
        };
        let simple = SimpleClassType {
            identifier: identifier.to_owned(),
            type_arguments: self.parse_type_arguments()?,
        };

        let mut suffixes = Vec::new();
        while self.eat('.') {
            let identifier = self.parse_identifier()?;
            suffixes.push(SimpleClassType {
                identifier: identifier.to_owned(),
                type_arguments: self.parse_type_arguments()?,
            });
        }
        self.expect(';')?;

        Ok(ClassType {
            package,
            simple,
            suffixes,
        })
    }

    fn parse_type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        let mut type_arguments = Vec::new();
        if !self.eat('<') {
            return Ok(type_arguments);
        }

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(SignatureError::NestingTooDeep {
                position: self.position,
                input: self.input.to_owned(),
            });
        }

        while !self.eat('>') {
            let type_argument = match self.peek() {
                Some('*') => {
                    self.bump();
                    TypeArgument::Any
                }
                Some('+') => {
                    self.bump();
                    TypeArgument::Extends(self.parse_reference_type()?)
                }
                Some('-') => {
                    self.bump();
                    TypeArgument::Super(self.parse_reference_type()?)
                }
                _ => TypeArgument::Exact(self.parse_reference_type()?),
            };
            type_arguments.push(type_argument);
        }

        self.depth -= 1;
        Ok(type_arguments)
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        let mut type_parameters = Vec::new();
        if !self.eat('<') {
            return Ok(type_parameters);
        }

        while !self.eat('>') {
            let identifier = self.parse_identifier()?.to_owned();
            self.expect(':')?;

            // The class bound may be empty when only interface bounds follow.
            let class_bound = match self.peek() {
                Some('L' | 'T' | '[') => Some(self.parse_reference_type()?),
                _ => None,
            };

            let mut interface_bounds = Vec::new();
            while self.eat(':') {
                interface_bounds.push(self.parse_reference_type()?);
            }

            type_parameters.push(TypeParameter {
                identifier,
                class_bound,
                interface_bounds,
            });
        }

        Ok(type_parameters)
    }

    fn parse_identifier(&mut self) -> Result<&'a str> {
        let start = self.position;
        while let Some(c) = self.peek() {
            if matches!(c, '.' | ';' | '[' | '/' | '<' | '>' | ':') {
                break;
            }
            self.bump();
        }

        if start == self.position {
            return Err(self.unexpected());
        }
        let input = self.input;
        Ok(&input[start..self.position])
    }

    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.position += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn finish(&self) -> Result<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(SignatureError::TrailingInput {
                position: self.position,
                input: self.input.to_owned(),
            })
        }
    }

    fn unexpected(&self) -> SignatureError {
        match self.peek() {
            Some(found) => SignatureError::UnexpectedChar {
                found,
                position: self.position,
                input: self.input.to_owned(),
            },
            None => SignatureError::UnexpectedEnd {
                input: self.input.to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod parse_class_type_tests {
    use super::*;

    #[test]
    fn it_should_parse_a_raw_class_type() {
        let class_type = Parser::new("Ljava/lang/String;").parse_class_type().unwrap();

        assert_eq!("java/lang/", class_type.package);
        assert_eq!("String", class_type.simple.identifier);
        assert!(class_type.simple.type_arguments.is_empty());
        assert!(class_type.suffixes.is_empty());
    }

    #[test]
    fn it_should_parse_nested_type_arguments() {
        let class_type = Parser::new("Ljava/util/Map<Ljava/lang/String;Ljava/util/List<TV;>;>;")
            .parse_class_type()
            .unwrap();

        assert_eq!(
            vec![
                TypeArgument::Exact(TypeTree::Class(ClassType::raw("java/lang/String"))),
                TypeArgument::Exact(TypeTree::Class(ClassType {
                    package: "java/util/".into(),
                    simple: SimpleClassType {
                        identifier: "List".into(),
                        type_arguments: vec![TypeArgument::Exact(TypeTree::TypeVariable(
                            "V".into()
                        ))],
                    },
                    suffixes: vec![],
                })),
            ],
            class_type.simple.type_arguments
        );
    }

    #[test]
    fn it_should_parse_wildcards() {
        let class_type = Parser::new("Ljava/util/Map<*+TK;-Ljava/lang/Number;>;")
            .parse_class_type()
            .unwrap();

        assert_eq!(
            vec![
                TypeArgument::Any,
                TypeArgument::Extends(TypeTree::TypeVariable("K".into())),
                TypeArgument::Super(TypeTree::Class(ClassType::raw("java/lang/Number"))),
            ],
            class_type.simple.type_arguments
        );
    }

    #[test]
    fn it_should_fail_if_the_semicolon_is_missing() {
        assert_eq!(
            Err(SignatureError::UnexpectedEnd {
                input: "Ljava/lang/String".into()
            }),
            Parser::new("Ljava/lang/String").parse_class_type()
        );
    }
}


#[cfg(test)]
mod parse_method_signature_tests {
    use super::*;

    #[test]
    fn it_should_parse_a_generic_method() {
        let signature = Parser::new("<T:Ljava/lang/Object;>(TT;[I)Ljava/util/List<TT;>;^TE;")
            .parse_method_signature()
            .unwrap();

        assert_eq!(1, signature.type_parameter_count());
        assert_eq!(2, signature.parameter_count());
        assert_eq!(Some(&TypeTree::TypeVariable("T".into())), signature.parameter(0));
        assert!(!signature.is_void());
        assert_eq!(Some(&TypeTree::TypeVariable("E".into())), signature.throws_signature(0));
    }

    #[test]
    fn it_should_accept_a_plain_descriptor() {
        let signature = Parser::new("(Ljava/lang/String;I)V")
            .parse_method_signature()
            .unwrap();

        assert!(signature.is_void());
        assert_eq!(2, signature.parameter_count());
    }

    #[test]
    fn it_should_reject_trailing_input() {
        assert!(matches!(
            Parser::new("()VX").parse_method_signature(),
            Err(SignatureError::TrailingInput { position: 3, .. })
        ));
    }
}
