//! Declarations: namespaces, records, enums, members and functions.

use rustc_hash::FxHashMap;

use super::{is_reserved, PResult, Parser};
use crate::eval::evaluate;
use crate::lexer::{spell, unquote, Token, TokenKind};
use crate::model::{
    Access, BaseSpecifier, Cursor, CursorKind, DeclFlags, ParamDecl, Severity, TypeRef,
};

/// Scope a declaration appears in.
#[derive(Copy, Clone, Debug)]
pub(super) enum Context<'n> {
    Namespace,
    Record { name: &'n str },
}

/// Name shown for declarators of an anonymous record or enum type.
const ANONYMOUS_TYPE: &str = "(anonymous)";

fn merge(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(format!("{a}, {b}")),
        (a, b) => a.or(b),
    }
}

/// Unqualified last segment of `a::b::C<T>`.
fn last_segment(qualified: &str) -> &str {
    let without_args = qualified.split('<').next().unwrap_or(qualified);
    without_args.rsplit("::").next().unwrap_or(without_args)
}

/// Strings inside `annotate("…")` calls of an attribute list.
fn annotate_strings(tokens: &[Token]) -> Vec<String> {
    let mut found = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.is_ident("annotate")
            && tokens.get(i + 1).is_some_and(|t| t.kind == TokenKind::LParen)
        {
            let text: String = tokens[i + 2..]
                .iter()
                .take_while(|t| t.kind == TokenKind::Str)
                .map(|t| unquote(&t.text))
                .collect();
            found.push(text);
        }
    }
    found
}

impl<'a> Parser<'a> {
    /// Annotations and attributes in front of the current position.
    ///
    /// Returns the combined annotation text; non-annotation attributes are
    /// skipped.
    pub(super) fn annotations(&mut self) -> Option<String> {
        let mut found: Vec<String> = Vec::new();
        loop {
            let before_paren = self.peek(1).kind == TokenKind::LParen;
            if self.at_ident("META") && before_paren {
                self.bump();
                found.push(spell(self.skip_group()));
            } else if (self.at_ident("__attribute__") || self.at_ident("__attribute"))
                && before_paren
            {
                self.bump();
                found.extend(annotate_strings(self.skip_group()));
            } else if self.at(TokenKind::LBracket) && self.peek(1).kind == TokenKind::LBracket {
                found.extend(annotate_strings(self.skip_group()));
            } else if (self.at_ident("alignas") || self.at_ident("__declspec")) && before_paren {
                self.bump();
                self.skip_group();
            } else {
                break;
            }
        }
        (!found.is_empty()).then(|| found.join(", "))
    }

    /// Index just past the group that opens at lookahead `i`.
    fn skip_ahead_group(&self, mut i: usize) -> usize {
        let mut depth = 0usize;
        loop {
            match self.peek(i).kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::Lt => {
                    depth += 1;
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Shr => depth = depth.saturating_sub(2),
                TokenKind::Eof | TokenKind::Semi => return i,
                _ => {}
            }
            i += 1;
            if depth == 0 {
                return i;
            }
        }
    }

    /// Lookahead index after attributes and the (possibly qualified)
    /// names that follow, with the number of names seen.
    fn scan_type_head(&self, mut i: usize) -> (usize, usize) {
        loop {
            let token = self.peek(i);
            let attribute_call = ["META", "__attribute__", "__attribute", "alignas", "__declspec"]
                .iter()
                .any(|w| token.is_ident(w))
                && self.peek(i + 1).kind == TokenKind::LParen;
            if attribute_call {
                i = self.skip_ahead_group(i + 1);
            } else if token.kind == TokenKind::LBracket
                && self.peek(i + 1).kind == TokenKind::LBracket
            {
                i = self.skip_ahead_group(i);
            } else {
                break;
            }
        }

        let mut names = 0;
        loop {
            let token = self.peek(i);
            if token.kind != TokenKind::Ident || is_reserved(&token.text) {
                break;
            }
            if names > 0 && token.is_ident("final") {
                i += 1;
                continue;
            }
            names += 1;
            i += 1;
            if self.peek(i).kind == TokenKind::Lt {
                i = self.skip_ahead_group(i);
            }
            if self.peek(i).kind == TokenKind::ColonColon {
                // `a::B` counts as one name
                names -= 1;
                i += 1;
            }
        }
        (i, names)
    }

    /// `class|struct|union` starting a definition or forward declaration,
    /// as opposed to an elaborated type in a declaration.
    fn is_record_head(&self) -> bool {
        let (i, names) = self.scan_type_head(1);
        match self.peek(i).kind {
            TokenKind::LBrace => true,
            TokenKind::Colon => names <= 2,
            TokenKind::Semi => names == 1,
            _ => false,
        }
    }

    fn is_enum_head(&self) -> bool {
        let start = if self.peek(1).is_ident("class") || self.peek(1).is_ident("struct") {
            2
        } else {
            1
        };
        let (i, names) = self.scan_type_head(start);
        match self.peek(i).kind {
            TokenKind::LBrace => true,
            TokenKind::Colon => names <= 1,
            TokenKind::Semi => names == 1,
            _ => false,
        }
    }

    pub(super) fn namespace_item(&mut self) -> PResult<Vec<Cursor>> {
        let annotation = self.annotations();
        let token = self.current();
        match token.kind {
            TokenKind::Semi => {
                self.bump();
                return Ok(Vec::new());
            }
            TokenKind::Ident | TokenKind::ColonColon | TokenKind::Tilde => {}
            _ => return Err(self.unexpected("a declaration")),
        }

        match &*token.text {
            "namespace" => self.namespace(),
            "inline" if self.peek(1).is_ident("namespace") => {
                self.bump();
                self.namespace()
            }
            "extern" if self.peek(1).kind == TokenKind::Str => self.linkage_spec(),
            "extern" if self.peek(1).is_ident("template") => {
                self.skip_declaration();
                Ok(Vec::new())
            }
            "template" => {
                self.template_declaration();
                Ok(Vec::new())
            }
            "using" => self.using_declaration(),
            "typedef" => self.typedef_declaration(),
            "static_assert" | "friend" => {
                self.skip_declaration();
                Ok(Vec::new())
            }
            "class" | "struct" | "union" if self.is_record_head() => {
                let record = self.record_definition(annotation)?;
                self.finish_type_declaration(record, Context::Namespace)
            }
            "enum" if self.is_enum_head() => {
                let enumeration = self.enum_definition(annotation)?;
                self.finish_type_declaration(enumeration, Context::Namespace)
            }
            _ => self.declaration(annotation, Context::Namespace),
        }
    }

    fn namespace(&mut self) -> PResult<Vec<Cursor>> {
        let keyword = self.bump();
        let mut names: Vec<&'a Token> = Vec::new();
        while self.at(TokenKind::Ident) && !is_reserved(&self.current().text) {
            names.push(self.bump());
            if !self.eat(TokenKind::ColonColon) {
                break;
            }
            self.eat_ident("inline");
        }
        self.annotations();

        if self.eat(TokenKind::Eq) {
            // Namespace alias
            self.skip_declaration();
            return Ok(Vec::new());
        }
        self.expect(TokenKind::LBrace, "'{'")?;
        let children = self.scope(true);
        self.eat(TokenKind::RBrace);

        if names.is_empty() {
            let mut cursor = Cursor::new(CursorKind::Namespace, "", self.location(keyword.span));
            cursor.children = children;
            return Ok(vec![cursor]);
        }

        // `namespace a::b { … }` nests
        let mut children = children;
        for name in names.iter().rev() {
            let mut cursor =
                Cursor::new(CursorKind::Namespace, &*name.text, self.location(name.span));
            cursor.children = children;
            children = vec![cursor];
        }
        Ok(children)
    }

    fn linkage_spec(&mut self) -> PResult<Vec<Cursor>> {
        let keyword = self.bump();
        self.bump();
        if !self.eat(TokenKind::LBrace) {
            return self.namespace_item();
        }
        let mut cursor = Cursor::new(CursorKind::LinkageSpec, "", self.location(keyword.span));
        cursor.children = self.scope(true);
        self.eat(TokenKind::RBrace);
        Ok(vec![cursor])
    }

    /// Skip `template <…>` and the declaration it introduces.
    fn template_declaration(&mut self) {
        while self.eat_ident("template") {
            self.skip_angles();
        }
        self.skip_declaration();
    }

    fn using_declaration(&mut self) -> PResult<Vec<Cursor>> {
        self.bump();
        let is_alias = self.at(TokenKind::Ident)
            && !is_reserved(&self.current().text)
            && matches!(self.peek(1).kind, TokenKind::Eq | TokenKind::LBracket)
            || self.peek(1).is_ident("META");
        if !is_alias {
            // using-directive or using-declaration
            self.skip_declaration();
            return Ok(Vec::new());
        }

        let name = self.bump();
        let annotation = self.annotations();
        self.expect(TokenKind::Eq, "'='")?;
        let ty = self.full_type()?;
        self.skip_declaration();

        let mut cursor = Cursor::new(CursorKind::TypeAlias, &*name.text, self.location(name.span));
        cursor.ty = Some(ty);
        cursor.annotation = annotation;
        Ok(vec![cursor])
    }

    fn typedef_declaration(&mut self) -> PResult<Vec<Cursor>> {
        self.bump();
        let annotation = self.annotations();
        let mut decls = Vec::new();

        let base = if (self.at_ident("struct") || self.at_ident("class") || self.at_ident("union"))
            && self.is_record_head()
        {
            let record = self.record_definition(annotation)?;
            let base = type_name_of(&record);
            decls.push(record);
            base
        } else if self.at_ident("enum") && self.is_enum_head() {
            let enumeration = self.enum_definition(annotation)?;
            let base = type_name_of(&enumeration);
            decls.push(enumeration);
            base
        } else {
            self.type_specifier()?
        };

        loop {
            let mut ty = base.clone();
            self.declarator_operators(&mut ty);
            if self.at(TokenKind::LParen) {
                // Function or function-pointer typedef
                self.skip_declaration();
                return Ok(decls);
            }
            let name = self.expect_ident("a typedef name")?;
            while self.at(TokenKind::LBracket) {
                self.skip_group();
            }

            // `typedef struct { … } Name;` names the record
            if let Some(record) = decls.first_mut() {
                if record.flags.contains(DeclFlags::ANONYMOUS) {
                    record.spelling = name.text.to_string();
                    record.flags.remove(DeclFlags::ANONYMOUS);
                }
            }
            if ty.base == ANONYMOUS_TYPE {
                ty.spelling = ty.spelling.replacen(ANONYMOUS_TYPE, &name.text, 1);
                ty.base = name.text.to_string();
            }

            let mut alias = Cursor::new(CursorKind::TypeAlias, &*name.text, self.location(name.span));
            alias.ty = Some(ty);
            decls.push(alias);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Semi, "';'")?;
        Ok(decls)
    }

    /// Record head, base clause and body, up to the closing brace.
    pub(super) fn record_definition(&mut self, annotation: Option<String>) -> PResult<Cursor> {
        let keyword = self.bump();
        let kind = match &*keyword.text {
            "class" => CursorKind::ClassDecl,
            "struct" => CursorKind::StructDecl,
            _ => CursorKind::UnionDecl,
        };
        let mut annotation = merge(annotation, self.annotations());
        let mut flags = DeclFlags::empty();
        let mut name = String::new();
        let mut name_token: Option<&'a Token> = None;

        // Leading unknown words are export macros; the last one is the name
        while self.at(TokenKind::Ident) && !is_reserved(&self.current().text) {
            if name_token.is_some() && self.at_ident("final") {
                self.bump();
                flags |= DeclFlags::FINAL;
                continue;
            }
            name_token = Some(self.current());
            name = last_segment(&self.qualified_name()?).to_string();
            annotation = merge(annotation, self.annotations());
        }

        let span = name_token.map_or(keyword.span, |t| t.span);
        let mut cursor = Cursor::new(kind, name.as_str(), self.location(span));
        cursor.annotation = annotation;
        if name.is_empty() {
            flags |= DeclFlags::ANONYMOUS;
        }

        if self.at(TokenKind::Semi) {
            cursor.flags = flags;
            return Ok(cursor);
        }

        if self.eat(TokenKind::Colon) {
            cursor.bases = self.base_clause(kind)?;
        }
        self.expect(TokenKind::LBrace, "'{'")?;
        let default_access = if kind == CursorKind::ClassDecl {
            Access::Private
        } else {
            Access::Public
        };
        cursor.children = self.record_body(&name, default_access);
        self.expect(TokenKind::RBrace, "'}'")?;
        cursor.flags = flags | DeclFlags::DEFINITION;
        Ok(cursor)
    }

    fn base_clause(&mut self, kind: CursorKind) -> PResult<Vec<BaseSpecifier>> {
        let mut bases = Vec::new();
        loop {
            let mut access = if kind == CursorKind::ClassDecl {
                Access::Private
            } else {
                Access::Public
            };
            let mut is_virtual = false;
            loop {
                if self.eat_ident("virtual") {
                    is_virtual = true;
                } else if let Some(a) = Access::from_keyword(&self.current().text) {
                    self.bump();
                    access = a;
                } else {
                    break;
                }
            }
            let spelling = self.qualified_name()?;
            self.eat(TokenKind::Ellipsis);
            bases.push(BaseSpecifier {
                spelling,
                access,
                is_virtual,
            });
            if !self.eat(TokenKind::Comma) {
                return Ok(bases);
            }
        }
    }

    fn record_body(&mut self, name: &str, default_access: Access) -> Vec<Cursor> {
        let mut access = default_access;
        let mut members = Vec::new();

        loop {
            if self.at(TokenKind::RBrace) || self.at_eof() {
                return members;
            }
            if self.at(TokenKind::Ident) && self.peek(1).kind == TokenKind::Colon {
                if let Some(a) = Access::from_keyword(&self.current().text) {
                    self.bump();
                    self.bump();
                    access = a;
                    continue;
                }
            }

            let start = self.pos;
            let items = match self.member_item(name) {
                Ok(items) => items,
                Err(err) => vec![self.invalid(err)],
            };
            members.extend(items.into_iter().map(|mut c| {
                c.access = access;
                c
            }));
            if self.pos == start {
                self.bump();
            }
        }
    }

    fn member_item(&mut self, record: &str) -> PResult<Vec<Cursor>> {
        let annotation = self.annotations();
        let token = self.current();
        let context = Context::Record { name: record };
        match token.kind {
            TokenKind::Semi => {
                self.bump();
                return Ok(Vec::new());
            }
            TokenKind::Ident | TokenKind::ColonColon | TokenKind::Tilde => {}
            _ => return Err(self.unexpected("a member declaration")),
        }

        match &*token.text {
            "template" => {
                self.template_declaration();
                Ok(Vec::new())
            }
            "friend" | "static_assert" => {
                self.skip_declaration();
                Ok(Vec::new())
            }
            "using" => self.using_declaration(),
            "typedef" => self.typedef_declaration(),
            "class" | "struct" | "union" if self.is_record_head() => {
                let record = self.record_definition(annotation)?;
                self.finish_type_declaration(record, context)
            }
            "enum" if self.is_enum_head() => {
                let enumeration = self.enum_definition(annotation)?;
                self.finish_type_declaration(enumeration, context)
            }
            _ => self.declaration(annotation, context),
        }
    }

    /// After a record or enum definition: `;` or declarators of that type.
    fn finish_type_declaration(
        &mut self,
        decl: Cursor,
        context: Context<'_>,
    ) -> PResult<Vec<Cursor>> {
        if self.eat(TokenKind::Semi) {
            return Ok(vec![decl]);
        }
        let base = type_name_of(&decl);
        let mut decls = vec![decl];
        decls.extend(self.declarators(&base, DeclFlags::empty(), None, context)?);
        Ok(decls)
    }

    pub(super) fn enum_definition(&mut self, annotation: Option<String>) -> PResult<Cursor> {
        let keyword = self.bump();
        let mut flags = DeclFlags::empty();
        if self.eat_ident("class") || self.eat_ident("struct") {
            flags |= DeclFlags::SCOPED;
        }
        let mut annotation = merge(annotation, self.annotations());
        let mut name = String::new();
        let mut span = keyword.span;
        if self.at(TokenKind::Ident) && !is_reserved(&self.current().text) {
            span = self.current().span;
            name = last_segment(&self.qualified_name()?).to_string();
            annotation = merge(annotation, self.annotations());
        }
        let underlying = if self.eat(TokenKind::Colon) {
            self.full_type()?
        } else {
            TypeRef::named("int")
        };

        let mut cursor = Cursor::new(CursorKind::EnumDecl, name.as_str(), self.location(span));
        cursor.annotation = annotation;
        cursor.ty = Some(underlying);
        if name.is_empty() {
            flags |= DeclFlags::ANONYMOUS;
        }
        if !self.eat(TokenKind::LBrace) {
            cursor.flags = flags;
            return Ok(cursor);
        }

        let mut local: FxHashMap<String, i64> = FxHashMap::default();
        let mut next_value = 0i64;
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let mut annotation = self.annotations();
            let token = self.expect_ident("an enumerator name")?;
            annotation = merge(annotation, self.annotations());

            let value = if self.eat(TokenKind::Eq) {
                let expr = self.skip_expression(&[]);
                let resolved = evaluate(expr, &|n| {
                    local.get(n).or_else(|| self.enum_constants.get(n)).copied()
                });
                match resolved {
                    Ok(value) => value,
                    Err(err) => {
                        self.diagnostic(
                            Severity::Warning,
                            token.span,
                            format!(
                                "cannot evaluate value of '{}': {err}; using {next_value}",
                                token.text
                            ),
                        );
                        next_value
                    }
                }
            } else {
                next_value
            };
            annotation = merge(annotation, self.annotations());

            let mut constant =
                Cursor::new(CursorKind::EnumConstant, &*token.text, self.location(token.span));
            constant.value = Some(value);
            constant.annotation = annotation;
            cursor.children.push(constant);

            local.insert(token.text.to_string(), value);
            self.enum_constants.insert(token.text.to_string(), value);
            next_value = value.wrapping_add(1);

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        cursor.flags = flags | DeclFlags::DEFINITION;
        Ok(cursor)
    }

    /// Functions, variables and fields.
    fn declaration(
        &mut self,
        annotation: Option<String>,
        context: Context<'_>,
    ) -> PResult<Vec<Cursor>> {
        let mut annotation = annotation;
        let mut flags = DeclFlags::empty();
        loop {
            annotation = merge(annotation, self.annotations());
            let token = self.current();
            if token.kind != TokenKind::Ident {
                break;
            }
            let flag = match &*token.text {
                "static" => DeclFlags::STATIC,
                "virtual" => DeclFlags::VIRTUAL,
                "inline" | "__inline" | "__forceinline" => DeclFlags::INLINE,
                "constexpr" | "consteval" | "constinit" => DeclFlags::CONSTEXPR,
                "mutable" => DeclFlags::MUTABLE,
                "explicit" => DeclFlags::EXPLICIT,
                "extern" | "thread_local" | "register" => DeclFlags::empty(),
                _ => break,
            };
            self.bump();
            flags |= flag;
            if flag == DeclFlags::EXPLICIT && self.at(TokenKind::LParen) {
                self.skip_group();
            }
        }

        if self.at(TokenKind::Tilde) {
            return self.destructor(annotation, flags, context);
        }
        if let Context::Record { name } = context {
            if !name.is_empty() && self.at_ident(name) && self.peek(1).kind == TokenKind::LParen {
                return self.constructor(annotation, flags);
            }
        }

        let token = self.current();
        if token.kind == TokenKind::Ident
            && self.peek(1).kind == TokenKind::LParen
            && !is_reserved(&token.text)
            && !matches!(&*token.text, "decltype" | "operator")
        {
            // Function-like macro invocation such as `GENERATED_BODY()`
            self.bump();
            self.skip_group();
            self.eat(TokenKind::Semi);
            self.diagnostic(
                Severity::Note,
                token.span,
                format!("skipped macro invocation '{}'", token.text),
            );
            return Ok(Vec::new());
        }
        if self.at_ident("operator") {
            // Conversion operator
            self.skip_declaration();
            return Ok(Vec::new());
        }

        let base = self.type_specifier()?;
        self.declarators(&base, flags, annotation, context)
    }

    /// Comma-separated declarators sharing `base`, through the final `;`.
    fn declarators(
        &mut self,
        base: &TypeRef,
        flags: DeclFlags,
        annotation: Option<String>,
        context: Context<'_>,
    ) -> PResult<Vec<Cursor>> {
        let mut decls = Vec::new();
        loop {
            let mut ty = base.clone();
            self.declarator_operators(&mut ty);
            if self.at_ident("operator") || self.at(TokenKind::LParen) {
                // Operator overload or parenthesised declarator
                self.skip_declaration();
                return Ok(decls);
            }

            let name_token = self.current();
            let name = last_segment(&self.qualified_name()?).to_string();
            let annotation = merge(annotation.clone(), self.annotations());

            if self.at(TokenKind::LParen) {
                let function = self.function_rest(name_token, name, ty, flags, annotation, context)?;
                decls.extend(function);
                return Ok(decls);
            }

            decls.extend(self.variable_rest(name_token, name, ty, flags, annotation, context));
            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::Semi, "';'")?;
                return Ok(decls);
            }
        }
    }

    fn constant_value(&self, tokens: &[Token]) -> Option<i64> {
        evaluate(tokens, &|n| self.enum_constants.get(n).copied()).ok()
    }

    fn variable_rest(
        &mut self,
        name_token: &'a Token,
        name: String,
        ty: TypeRef,
        flags: DeclFlags,
        annotation: Option<String>,
        context: Context<'_>,
    ) -> Option<Cursor> {
        let mut array_len: Option<u64> = None;
        while self.at(TokenKind::LBracket) {
            let bound = self.skip_group();
            let count = self
                .constant_value(bound)
                .and_then(|v| u64::try_from(v).ok());
            if count.is_none() {
                self.diagnostic(
                    Severity::Warning,
                    name_token.span,
                    format!("array bound of '{name}' is not a constant"),
                );
            }
            array_len = Some(array_len.unwrap_or(1).saturating_mul(count.unwrap_or(0)));
        }

        let mut bit_width = None;
        if self.eat(TokenKind::Colon) {
            let width = self.skip_expression(&[TokenKind::Eq, TokenKind::LBrace]);
            bit_width = self
                .constant_value(width)
                .and_then(|v| u32::try_from(v).ok());
        }

        if self.eat(TokenKind::Eq) {
            self.skip_expression(&[]);
        } else if self.at(TokenKind::LBrace) {
            self.skip_group();
        }

        let kind = match context {
            Context::Record { .. } if !flags.contains(DeclFlags::STATIC) => CursorKind::FieldDecl,
            Context::Record { .. } => CursorKind::VarDecl,
            Context::Namespace if self.keep_free_declarations => CursorKind::VarDecl,
            Context::Namespace => return None,
        };
        let mut cursor = Cursor::new(kind, name, self.location(name_token.span));
        cursor.ty = Some(ty);
        cursor.flags = flags;
        cursor.annotation = annotation;
        cursor.array_len = array_len;
        cursor.bit_width = bit_width;
        Some(cursor)
    }

    fn function_rest(
        &mut self,
        name_token: &'a Token,
        name: String,
        return_type: TypeRef,
        flags: DeclFlags,
        annotation: Option<String>,
        context: Context<'_>,
    ) -> PResult<Option<Cursor>> {
        let (params, variadic) = self.parameters()?;
        let mut flags = flags;
        if variadic {
            flags |= DeclFlags::VARIADIC;
        }
        let mut return_type = return_type;
        self.function_qualifiers(&mut flags, &mut return_type)?;
        self.function_body(&mut flags)?;

        let kind = match context {
            Context::Record { .. } => CursorKind::Method,
            Context::Namespace if self.keep_free_declarations => CursorKind::FunctionDecl,
            Context::Namespace => return Ok(None),
        };
        let mut cursor = Cursor::new(kind, name, self.location(name_token.span));
        cursor.ty = Some(return_type);
        cursor.params = params;
        cursor.flags = flags;
        cursor.annotation = annotation;
        Ok(Some(cursor))
    }

    fn constructor(
        &mut self,
        annotation: Option<String>,
        flags: DeclFlags,
    ) -> PResult<Vec<Cursor>> {
        let name = self.bump();
        let (params, variadic) = self.parameters()?;
        let mut flags = flags;
        if variadic {
            flags |= DeclFlags::VARIADIC;
        }
        let mut unused = TypeRef::named("void");
        self.function_qualifiers(&mut flags, &mut unused)?;
        self.function_body(&mut flags)?;

        let mut cursor = Cursor::new(CursorKind::Constructor, &*name.text, self.location(name.span));
        cursor.params = params;
        cursor.flags = flags;
        cursor.annotation = annotation;
        Ok(vec![cursor])
    }

    fn destructor(
        &mut self,
        annotation: Option<String>,
        flags: DeclFlags,
        context: Context<'_>,
    ) -> PResult<Vec<Cursor>> {
        let tilde = self.bump();
        let name = self.expect_ident("a destructor name")?;
        self.parameters()?;
        let mut flags = flags;
        let mut unused = TypeRef::named("void");
        self.function_qualifiers(&mut flags, &mut unused)?;
        self.function_body(&mut flags)?;

        if matches!(context, Context::Namespace) {
            // Out-of-line definition
            return Ok(Vec::new());
        }
        let mut cursor = Cursor::new(
            CursorKind::Destructor,
            format!("~{}", name.text),
            self.location(tilde.span.merge(name.span)),
        );
        cursor.flags = flags;
        cursor.annotation = annotation;
        Ok(vec![cursor])
    }

    /// Parenthesised parameter list. Returns the parameters and whether
    /// the list ends in `...`.
    fn parameters(&mut self) -> PResult<(Vec<ParamDecl>, bool)> {
        self.expect(TokenKind::LParen, "'('")?;
        if self.eat(TokenKind::RParen) {
            return Ok((Vec::new(), false));
        }
        if self.at_ident("void") && self.peek(1).kind == TokenKind::RParen {
            self.bump();
            self.bump();
            return Ok((Vec::new(), false));
        }

        let mut params = Vec::new();
        loop {
            self.annotations();
            if self.eat(TokenKind::Ellipsis) {
                self.expect(TokenKind::RParen, "')'")?;
                return Ok((params, true));
            }

            let mut ty = self.full_type()?;
            let mut name = String::new();
            if self.at(TokenKind::LParen) {
                // Function pointer: `void (*callback)(int)`
                let inner = self.skip_group();
                if let Some(ident) = inner.iter().rev().find(|t| t.kind == TokenKind::Ident) {
                    name = ident.text.to_string();
                }
                let signature = self.skip_group();
                ty.spelling = format!("{}(*)({})", ty.spelling, spell(signature));
                ty.pointer_depth = ty.pointer_depth.saturating_add(1);
            } else if self.at(TokenKind::Ident) && !is_reserved(&self.current().text) {
                name = self.bump().text.to_string();
            }
            while self.at(TokenKind::LBracket) {
                // Array parameters decay to pointers
                self.skip_group();
                ty.pointer_depth = ty.pointer_depth.saturating_add(1);
                ty.spelling.push('*');
            }
            self.annotations();

            let has_default = self.eat(TokenKind::Eq);
            if has_default {
                self.skip_expression(&[]);
            }
            params.push(ParamDecl {
                name,
                ty,
                has_default,
            });

            if !self.eat(TokenKind::Comma) {
                self.expect(TokenKind::RParen, "')'")?;
                return Ok((params, false));
            }
        }
    }

    /// Qualifiers between the parameter list and the body.
    fn function_qualifiers(
        &mut self,
        flags: &mut DeclFlags,
        return_type: &mut TypeRef,
    ) -> PResult<()> {
        loop {
            match self.current().kind {
                TokenKind::Ident => {
                    let flag = match &*self.current().text {
                        "const" => DeclFlags::CONST,
                        "override" => DeclFlags::OVERRIDE,
                        "final" => DeclFlags::FINAL,
                        "noexcept" => DeclFlags::NOEXCEPT,
                        "volatile" => DeclFlags::empty(),
                        "throw" => {
                            self.bump();
                            self.skip_group();
                            continue;
                        }
                        "requires" => {
                            self.bump();
                            self.skip_expression(&[TokenKind::LBrace, TokenKind::Eq]);
                            continue;
                        }
                        _ => {
                            if self.annotations().is_none() {
                                return Ok(());
                            }
                            continue;
                        }
                    };
                    self.bump();
                    *flags |= flag;
                    if flag == DeclFlags::NOEXCEPT && self.at(TokenKind::LParen) {
                        self.skip_group();
                    }
                }
                TokenKind::Amp | TokenKind::AmpAmp => {
                    self.bump();
                }
                TokenKind::Arrow => {
                    self.bump();
                    *return_type = self.full_type()?;
                }
                TokenKind::LBracket if self.peek(1).kind == TokenKind::LBracket => {
                    self.skip_group();
                }
                _ => return Ok(()),
            }
        }
    }

    /// `= 0;`, `= default;`, `= delete;`, `;` or a (skipped) body,
    /// optionally preceded by a constructor initializer list.
    fn function_body(&mut self, flags: &mut DeclFlags) -> PResult<()> {
        if self.eat(TokenKind::Eq) {
            let token = self.current();
            if token.kind == TokenKind::Int && &*token.text == "0" {
                *flags |= DeclFlags::PURE;
            } else if token.is_ident("default") {
                *flags |= DeclFlags::DEFAULTED;
            } else if token.is_ident("delete") {
                *flags |= DeclFlags::DELETED;
            } else {
                return Err(self.unexpected("'0', 'default' or 'delete'"));
            }
            self.bump();
            self.expect(TokenKind::Semi, "';'")?;
            return Ok(());
        }

        if self.eat(TokenKind::Colon) {
            loop {
                self.qualified_name()?;
                if matches!(self.current().kind, TokenKind::LParen | TokenKind::LBrace) {
                    self.skip_group();
                } else {
                    return Err(self.unexpected("a member initializer"));
                }
                self.eat(TokenKind::Ellipsis);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        if self.at(TokenKind::LBrace) {
            self.skip_group();
            self.eat(TokenKind::Semi);
            *flags |= DeclFlags::DEFINITION;
            return Ok(());
        }
        self.expect(TokenKind::Semi, "';'")?;
        Ok(())
    }
}

/// Type of declarators that follow a record or enum definition.
fn type_name_of(decl: &Cursor) -> TypeRef {
    if decl.spelling.is_empty() {
        TypeRef::named(ANONYMOUS_TYPE)
    } else {
        TypeRef::named(decl.spelling.as_str())
    }
}
