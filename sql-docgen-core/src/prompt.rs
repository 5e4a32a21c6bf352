//! Prompt sent to the text-generation service for one annotation task.
//!
//! Fixed instructions, then one worked example, then the task's SQL.

const INSTRUCTIONS: &str = "\
Convierte el siguiente script SQL en una descripción detallada en lenguaje natural con formato Markdown.
La descripción debe ser clara y estructurada y seguir exactamente este formato:

**[NOMBRE DE LA TABLA EN MAYÚSCULAS]**
- **Descripción:** [Explicación general de la tabla]
- **Campos:**
    - **[Nombre del campo] ([Tipo de dato]):** [Explicación del campo]
- **Relaciones:**
    - [Detalles de las relaciones, incluyendo llaves foráneas]
";

const EXAMPLE_SQL: &str = "\
CREATE TABLE Usuarios (
    id_usuario INT PRIMARY KEY,
    nombre VARCHAR(100),
    email VARCHAR(100) UNIQUE,
    id_rol INT,
    FOREIGN KEY (id_rol) REFERENCES Roles(id_rol)
);";

const EXAMPLE_DOC: &str = "\
**USUARIOS**
- **Descripción:** Esta tabla guarda información de los usuarios.
- **Campos:**
    - **id_usuario (INT):** Identificador único de cada usuario, sirve como clave primaria.
    - **nombre (VARCHAR(100)):** Nombre del usuario.
    - **email (VARCHAR(100)):** Correo electrónico del usuario, debe ser único.
    - **id_rol (INT):** Identificador del rol del usuario, clave foránea que referencia a la tabla ROLES.
- **Relaciones:**
    - Existe una relación con la tabla ROLES a través del campo id_rol.";

/// Compose the full prompt for one task's SQL blob.
pub fn build_prompt(sql: &str) -> String {
    format!(
        "{INSTRUCTIONS}\nEjemplo:\nDado el siguiente script SQL:\n{EXAMPLE_SQL}\n\n\
         La transcripción sería:\n{EXAMPLE_DOC}\n\n\
         Ahora transcribe el siguiente script SQL siguiendo este formato:\n{sql}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ends_with_the_task_sql_after_the_example() {
        let sql = "CREATE TABLE Roles (id_rol INT PRIMARY KEY);";
        let prompt = build_prompt(sql);
        let example_at = prompt.find("CREATE TABLE Usuarios").expect("worked example present");
        let task_at = prompt.rfind(sql).expect("task sql present");
        assert!(prompt.starts_with("Convierte el siguiente script SQL"));
        assert!(example_at < task_at);
        assert!(prompt.contains("**USUARIOS**"));
        assert!(prompt.trim_end().ends_with(sql));
    }
}
