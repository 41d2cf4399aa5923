/// Built-in canonical skills and their aliases. The canonical name is always
/// registered as an alias of itself. Aliases must name the skill itself, not
/// a neighbouring concept ("jvm", "containers") or a common word ("spring").
pub(super) const BUILTIN_SKILLS: &[(&str, &[&str])] = &[
    // Languages
    ("javascript", &["js", "ecmascript", "es6", "java script"]),
    ("typescript", &["ts", "type script"]),
    ("python", &["python3", "python 3", "py"]),
    ("java", &["java 8", "java 11", "java 17"]),
    ("kotlin", &["kt"]),
    ("rust", &["rustlang", "rust-lang"]),
    ("golang", &["go lang", "go-lang"]),
    ("c++", &["cpp", "cplusplus"]),
    ("c#", &["csharp", "c sharp"]),
    ("ruby", &[]),
    ("php", &[]),
    ("scala", &[]),
    ("swift", &[]),
    ("sql", &["t-sql", "pl/sql", "ansi sql"]),
    ("html", &["html5"]),
    ("css", &["css3", "cascading style sheets"]),
    // Frontend
    ("react", &["reactjs", "react.js", "react js"]),
    ("react native", &["react-native"]),
    ("vue", &["vue.js", "vuejs", "vue js"]),
    ("angular", &["angularjs", "angular.js"]),
    ("svelte", &["sveltejs"]),
    ("next.js", &["nextjs", "next js"]),
    ("redux", &[]),
    ("tailwind", &["tailwindcss", "tailwind css"]),
    ("sass", &["scss"]),
    // Backend
    ("node.js", &["nodejs", "node js", "node"]),
    ("express", &["express.js", "expressjs"]),
    ("spring boot", &["springboot", "spring framework"]),
    ("django", &["django rest framework", "drf"]),
    ("flask", &[]),
    ("fastapi", &["fast api"]),
    ("ruby on rails", &["rails", "ror"]),
    (".net", &["dotnet", "asp.net", ".net core"]),
    ("graphql", &["graph ql"]),
    ("rest api", &["restful", "rest apis", "restful api", "restful apis"]),
    ("microservices", &["microservice", "micro-services"]),
    // Data stores
    ("postgresql", &["postgres", "psql"]),
    ("mysql", &["mariadb"]),
    ("mongodb", &["mongo"]),
    ("redis", &[]),
    ("elasticsearch", &["elastic search"]),
    ("kafka", &["apache kafka"]),
    // Cloud and infrastructure
    ("aws", &["amazon web services"]),
    ("gcp", &["google cloud", "google cloud platform"]),
    ("azure", &["microsoft azure"]),
    ("docker", &["dockerfile", "docker compose", "docker-compose"]),
    ("kubernetes", &["k8s"]),
    ("terraform", &[]),
    ("ci/cd", &["cicd", "continuous integration", "continuous delivery"]),
    ("linux", &["unix"]),
    ("git", &["github", "gitlab"]),
    // Data and ML
    ("machine learning", &["ml"]),
    ("deep learning", &[]),
    ("natural language processing", &["nlp"]),
    ("computer vision", &[]),
    ("data analysis", &["data analytics"]),
    ("pytorch", &["torch"]),
    ("tensorflow", &["tensor flow"]),
    ("pandas", &[]),
    ("spark", &["apache spark", "pyspark"]),
    // Practice and soft skills
    ("distributed systems", &["distributed computing"]),
    ("systems programming", &[]),
    ("agile", &["scrum", "kanban"]),
    ("ui/ux", &["ux", "ui design", "ux design", "user experience"]),
    ("figma", &[]),
    ("project management", &[]),
    ("communication", &["communication skills"]),
    ("leadership", &["team leadership"]),
];
