use util_jvm::export_module;
use util_jvm::prelude::*;

const MY_MODULE_NAMESPACE: &str = "http://www.example.com/modules/my-module";

/// The one function this module exposes.
#[derive(Default)]
struct Hello;

impl ExternalFunction for Hello {
    fn uri(&self) -> &str {
        MY_MODULE_NAMESPACE
    }

    fn local_name(&self) -> &str {
        "hello"
    }
}

#[derive(Default)]
struct MyModule {
    hello: Hello,
}

impl MyModule {
    /// Borrow the process JVM for a call, attaching this thread if needed.
    #[allow(dead_code)]
    fn with_jvm(&self, ctx: &dyn StaticContext, props: &dyn GlobalProperties) -> Result<()> {
        let manager = JvmManager::shared(JvmConfig::default())?;
        let jvm = manager.get_instance(ctx, props)?;
        let env = jvm.env();

        if env.find_class("java/lang/System").is_none() {
            log::warn!("[my_module] java/lang/System not found");
        }
        env.check_exception()
    }
}

impl ExternalModule for MyModule {
    fn uri(&self) -> &str {
        MY_MODULE_NAMESPACE
    }

    fn external_function(&self, local_name: &str) -> Option<&dyn ExternalFunction> {
        match local_name {
            "hello" => Some(&self.hello),
            _ => None,
        }
    }
}

export_module!(MyModule);
