use crate::tree_walk_interpreter::{
    format_number, NativeContext, NativeError, NativeFunctionException, RuntimeValue,
};

use super::FORMAT_EXCEPTION;

type Out = Result<RuntimeValue, NativeError>;

pub fn to_number(ctx: &mut NativeContext) -> Out {
    let string = ctx.string("string")?;
    // `parse` also accepts "inf" and "NaN", which are not number literals.
    match string.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value.into()),
        _ => Err(NativeFunctionException::new(FORMAT_EXCEPTION, "Not a valid number").into()),
    }
}

pub fn number_to_string(ctx: &mut NativeContext) -> Out {
    Ok(format_number(ctx.number("value")?).into())
}

pub fn boolean_to_string(ctx: &mut NativeContext) -> Out {
    Ok(ctx.boolean("value")?.to_string().into())
}

pub fn to_boolean(ctx: &mut NativeContext) -> Out {
    match ctx.string("string")?.as_str() {
        "true" => Ok(true.into()),
        "false" => Ok(false.into()),
        _ => Err(NativeFunctionException::new(FORMAT_EXCEPTION, "Not a valid boolean").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::call;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers() {
        assert_eq!(call("to_num", &[" 12.5\t".into()]), Ok(12.5.into()));
        assert_eq!(call("to_num", &["-3".into()]), Ok((-3.0).into()));
        assert_eq!(
            call("to_num", &["12abc".into()]),
            Err((
                "FORMAT_EXCEPTION".to_string(),
                "Not a valid number".to_string()
            ))
        );
        for text in ["nan", "inf", "-Infinity"] {
            assert_eq!(
                call("to_num", &[text.into()]),
                Err((
                    "FORMAT_EXCEPTION".to_string(),
                    "Not a valid number".to_string()
                ))
            );
        }
        assert_eq!(call("to_str", &[3.0.into()]), Ok("3".into()));
        assert_eq!(call("to_str", &[0.25.into()]), Ok("0.25".into()));
    }

    #[test]
    fn booleans() {
        assert_eq!(call("to_bool", &["true".into()]), Ok(true.into()));
        assert_eq!(call("to_bool", &["false".into()]), Ok(false.into()));
        assert_eq!(
            call("to_bool", &["True".into()]),
            Err((
                "FORMAT_EXCEPTION".to_string(),
                "Not a valid boolean".to_string()
            ))
        );
        assert_eq!(call("to_str", &[false.into()]), Ok("false".into()));
    }
}
