//! Static capability and help texts

use async_trait::async_trait;

use bank_assistant_core::Tool;

pub const SYSTEM_INFO_NAME: &str = "informacion_sistema";
pub const SYSTEM_INFO_DESCRIPTION: &str = "Proporciona información sobre las capacidades del sistema";

pub const HELP_NAME: &str = "ayuda_general";
pub const HELP_DESCRIPTION: &str = "Proporciona ayuda y ejemplos de uso";

pub const SYSTEM_INFO: &str = "🤖 Capacidades del Asistente Inteligente:

🏦 **Servicios Bancarios:**
• Consultas sobre productos bancarios (cuentas, préstamos, tarjetas)
• Cálculos financieros (préstamos, ahorros, intereses)
• Información sobre tarifas y comisiones

👨‍🎓 **Sistema Educativo (MyrluxBack):**
• Consultar información de estudiantes
• Listar todos los estudiantes registrados

🌐 **Servicios Generales:**
• Información del clima por ciudad
• Conversión entre monedas (USD, MXN, EUR)
• Calculadora financiera avanzada

💬 **Ejemplos de uso:**
• \"¿Cómo abrir una cuenta de ahorros?\"
• \"Calcula un préstamo de 50000 pesos a 18% por 24 meses\"
• \"Muestra información del estudiante ID 123\"
• \"¿Cuál es el clima en Guadalajara?\"
• \"Convierte 100 USD a MXN\"
";

pub const HELP_TEXT: &str = "📋 **Ejemplos de Consultas:**

**Bancarias:**
• \"¿Qué documentos necesito para un crédito personal?\"
• \"¿Cuáles son las comisiones de la tarjeta de crédito?\"
• \"prestamo 100000 15 36\" (cálculo de préstamo)

**Estudiantes:**
• \"Consulta el estudiante 123\"
• \"Muestra todos los estudiantes\"

**Utilidades:**
• \"¿Cuál es el clima en Monterrey?\"
• \"Convierte 500 MXN a USD\"
• \"ahorro 2000 4 24\" (cálculo de ahorro)

**Conversacional:**
• Puedo recordar nuestra conversación
• Hago preguntas de seguimiento
• Combino información de múltiples fuentes
";

/// Greeting every new session starts with
pub const WELCOME: &str = "¡Hola! Soy tu asistente bancario inteligente 🤖

**Puedo ayudarte con:**
🏦 **Consultas bancarias** - productos, servicios, cálculos
👨‍🎓 **Gestión de estudiantes** - consultar información de MyrluxBack
🌤️ **Información del clima** - consultas meteorológicas
💱 **Conversión de monedas** - USD, MXN, EUR
🧮 **Cálculos financieros** - préstamos, ahorros, intereses

**Ejemplos:**
• \"¿Cómo abrir una cuenta de ahorros?\"
• \"Calcula un préstamo de 50000 pesos al 18% por 24 meses\"
• \"Muestra información del estudiante 123\"
• \"¿Cuál es el clima en Guadalajara?\"

¿En qué puedo ayudarte?";

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInfoTool;

#[async_trait]
impl Tool for SystemInfoTool {
    fn name(&self) -> &str {
        SYSTEM_INFO_NAME
    }

    fn description(&self) -> &str {
        SYSTEM_INFO_DESCRIPTION
    }

    async fn invoke(&self, _input: &str) -> String {
        SYSTEM_INFO.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HelpTool;

#[async_trait]
impl Tool for HelpTool {
    fn name(&self) -> &str {
        HELP_NAME
    }

    fn description(&self) -> &str {
        HELP_DESCRIPTION
    }

    async fn invoke(&self, _input: &str) -> String {
        HELP_TEXT.to_string()
    }
}
